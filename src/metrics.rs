use unicode_width::UnicodeWidthStr;

use crate::style::FontSpec;

/// Pixel measurements for one resolved font.
pub trait FontMetrics {
    fn pixel_width(&self, text: &str) -> i64;
    fn pixel_height(&self) -> i64;
}

/// Resolves a style font description to its metrics.
///
/// Lookups are expected to be idempotent; callers that measure a lot may
/// memoize the provider, the sizing code never does.
pub trait FontMetricsProvider {
    type Metrics: FontMetrics;

    fn metrics(&self, font: &FontSpec) -> Self::Metrics;
}

/// Approximates every font as monospace: each display column advances by
/// `advance_ratio * size` pixels and a line is `line_height_ratio * size` high.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceFonts {
    pub advance_ratio: f64,
    pub line_height_ratio: f64,
}

impl Default for MonospaceFonts {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    advance: f64,
    height: i64,
}

impl FontMetricsProvider for MonospaceFonts {
    type Metrics = MonospaceMetrics;

    fn metrics(&self, font: &FontSpec) -> MonospaceMetrics {
        MonospaceMetrics {
            advance: self.advance_ratio * font.size,
            height: (self.line_height_ratio * font.size).round() as i64,
        }
    }
}

impl FontMetrics for MonospaceMetrics {
    fn pixel_width(&self, text: &str) -> i64 {
        (widest_line(text) as f64 * self.advance).round() as i64
    }

    fn pixel_height(&self) -> i64 {
        self.height
    }
}

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Display width of the widest line, lines being separated by `<br>`,
/// `<br/>` or `<br />` in any letter case.
pub fn widest_line(s: &str) -> usize {
    break_lines(s).into_iter().map(display_width).max().unwrap_or(0)
}

fn break_lines(s: &str) -> Vec<&str> {
    const TAGS: [&str; 3] = ["<br/>", "<br />", "<br>"];
    let lower = s.to_ascii_lowercase();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut cursor = 0;
    while let Some(offset) = lower[cursor..].find("<br") {
        let at = cursor + offset;
        match TAGS.iter().find(|tag| lower[at..].starts_with(*tag)) {
            Some(tag) => {
                lines.push(&s[start..at]);
                start = at + tag.len();
                cursor = start;
            }
            None => cursor = at + 3,
        }
    }
    lines.push(&s[start..]);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(size: f64) -> FontSpec {
        FontSpec {
            family: "Courier".into(),
            size,
        }
    }

    #[test]
    fn break_lines_variants() {
        assert_eq!(break_lines("a"), vec!["a"]);
        assert_eq!(break_lines("a<br/>b<BR>c<br />d"), vec!["a", "b", "c", "d"]);
        assert_eq!(break_lines("a<bra>b"), vec!["a<bra>b"]);
    }

    #[test]
    fn widest_line_uses_display_width() {
        assert_eq!(widest_line("ab<br>abcd"), 4);
        assert_eq!(widest_line("日本"), 4);
        assert_eq!(widest_line(""), 0);
    }

    #[test]
    fn monospace_metrics_scale_with_font_size() {
        let fonts = MonospaceFonts {
            advance_ratio: 0.5,
            line_height_ratio: 1.25,
        };
        let m = fonts.metrics(&font(10.0));
        assert_eq!(m.pixel_width("abcd"), 20);
        assert_eq!(m.pixel_height(), 13);
        let big = fonts.metrics(&font(20.0));
        assert_eq!(big.pixel_width("abcd"), 40);
        assert_eq!(big.pixel_height(), 25);
    }
}
