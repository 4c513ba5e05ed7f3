use crate::descriptor::{ColorRef, Expr, Instruction, Item, round1};
use crate::error::{Error, Result};
use crate::metrics::{FontMetrics, FontMetricsProvider};
use crate::style::{FontSpec, Style};

#[derive(Debug, Clone)]
struct AttributeGeometry {
    font: FontSpec,
    width: i64,
    height: i64,
    text_height_ratio: f64,
}

/// One printable attribute line of an association.
#[derive(Debug, Clone)]
pub struct Attribute {
    label: String,
    data_type: Option<String>,
    index: usize,
    geometry: Option<AttributeGeometry>,
}

impl Attribute {
    /// `raw` may end with a bracketed data type, e.g. `date [DATE]`.
    pub fn new(raw: &str, index: usize) -> Self {
        let raw = raw.trim();
        let (label, data_type) = match raw.strip_suffix(']').and_then(|s| s.rsplit_once('[')) {
            Some((label, data_type)) => (label.trim(), Some(data_type.trim().to_string())),
            None => (raw, None),
        };
        Self {
            label: label.to_string(),
            data_type,
            index,
            geometry: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    /// Position in the clause, stable across sizing and description.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> Option<i64> {
        self.geometry.as_ref().map(|g| g.width)
    }

    pub fn height(&self) -> Option<i64> {
        self.geometry.as_ref().map(|g| g.height)
    }

    pub fn calculate_size<P: FontMetricsProvider>(&mut self, style: &Style, provider: &P) -> Result<()> {
        self.geometry = None;
        let font = style.font("association_attribute_font")?;
        let text_height_ratio = style.number("attribute_text_height_ratio")?;
        let metrics = provider.metrics(&font);
        let geometry = AttributeGeometry {
            width: metrics.pixel_width(&self.label),
            height: metrics.pixel_height(),
            font,
            text_height_ratio,
        };
        tracing::trace!(
            attribute = %self.label,
            index = self.index,
            width = geometry.width,
            height = geometry.height,
            "sized attribute"
        );
        self.geometry = Some(geometry);
        Ok(())
    }

    /// Text drawn at `(x + dx, y + dy)`, `y` shifted down to the baseline.
    pub fn describe(&self, dx: i64, dy: i64) -> Result<Vec<Item>> {
        let g = self.geometry.as_ref().ok_or_else(|| Error::NotSized {
            element: format!("attribute `{}`", self.label),
        })?;
        let baseline = dy as f64 + round1(g.text_height_ratio * g.height as f64);
        Ok(vec![
            Instruction::Text {
                text: self.label.clone(),
                color: ColorRef::new("association_attribute_text_color"),
                x: Expr::symbol("x").plus(dx as f64),
                y: Expr::symbol("y").plus(baseline),
                family: g.font.family.clone(),
                size: g.font.size,
                note: None,
            }
            .into(),
        ])
    }
}

/// Splits an attribute list on top-level commas, leaving commas nested in
/// `()`, `[]` or `{}` inside their attribute.
pub fn split_attributes(segment: &str) -> Result<Vec<String>> {
    if segment.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut start = 0;
    for (at, ch) in segment.char_indices() {
        match ch {
            '(' | '[' | '{' => open.push((ch, at)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match open.pop() {
                    Some((opener, _)) if opener == expected => {}
                    Some((opener, _)) => {
                        return Err(Error::InvalidAttributeSyntax {
                            fragment: segment[start..=at].trim().to_string(),
                            reason: format!("`{ch}` closes `{opener}`"),
                        });
                    }
                    None => {
                        return Err(Error::InvalidAttributeSyntax {
                            fragment: segment[start..=at].trim().to_string(),
                            reason: format!("unmatched `{ch}`"),
                        });
                    }
                }
            }
            ',' if open.is_empty() => {
                parts.push(segment[start..at].trim().to_string());
                start = at + 1;
            }
            _ => {}
        }
    }
    if let Some((opener, at)) = open.first() {
        return Err(Error::InvalidAttributeSyntax {
            fragment: segment[*at..].trim().to_string(),
            reason: format!("unclosed `{opener}`"),
        });
    }
    parts.push(segment[start..].trim().to_string());
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_plain_list() {
        assert_eq!(split_attributes(" a, b ,c").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_blank_is_empty() {
        assert!(split_attributes("   ").unwrap().is_empty());
    }

    #[test]
    fn split_honors_nesting() {
        assert_eq!(
            split_attributes("price [DECIMAL(10,2)], note {a, b}").unwrap(),
            vec!["price [DECIMAL(10,2)]", "note {a, b}"]
        );
    }

    #[test]
    fn split_keeps_empty_items() {
        assert_eq!(split_attributes("a,,b").unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn split_unclosed_bracket() {
        let err = split_attributes("a, b [INT").unwrap_err();
        match err {
            Error::InvalidAttributeSyntax { fragment, reason } => {
                assert_eq!(fragment, "[INT");
                assert!(reason.contains("unclosed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn split_mismatched_bracket() {
        let err = split_attributes("a (b]").unwrap_err();
        assert!(err.to_string().contains("`]` closes `(`"), "got: {err}");
    }

    #[test]
    fn new_strips_data_type() {
        let a = Attribute::new(" date [DATE] ", 3);
        assert_eq!(a.label(), "date");
        assert_eq!(a.data_type(), Some("DATE"));
        assert_eq!(a.index(), 3);
        let b = Attribute::new("quantity", 0);
        assert_eq!(b.label(), "quantity");
        assert_eq!(b.data_type(), None);
    }

    #[test]
    fn describe_before_sizing_fails() {
        let a = Attribute::new("quantity", 0);
        assert!(matches!(a.describe(0, 0), Err(Error::NotSized { .. })));
    }
}
