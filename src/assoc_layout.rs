use crate::assoc_ast::{Association, Variant};
use crate::attribute::Attribute;
use crate::error::Result;
use crate::metrics::{FontMetrics, FontMetricsProvider};
use crate::style::{FontSpec, Style};

/// Style constants and font measures captured by one sizing pass.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub margin_width: i64,
    pub margin_height: i64,
    pub rect_margin_height: i64,
    pub line_skip: i64,
    pub corner_radius: i64,
    pub box_stroke_depth: f64,
    pub inner_stroke_depth: f64,
    pub df_text_height_ratio: f64,
    pub cartouche_text_height_ratio: f64,
    pub cartouche_font: FontSpec,
    pub cartouche_height: i64,
    pub attribute_height: i64,
    /// Width of the text drawn in the shape: the df label or the cartouche.
    pub label_width: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct Geometry {
    pub frame: Frame,
    pub width: i64,
    pub height: i64,
}

impl Frame {
    fn read<P: FontMetricsProvider>(style: &Style, provider: &P) -> Result<Self> {
        let cartouche_font = style.font("association_cartouche_font")?;
        let attribute_font = style.font("association_attribute_font")?;
        let cartouche_metrics = provider.metrics(&cartouche_font);
        Ok(Self {
            margin_width: style.integer("round_rect_margin_width")?,
            margin_height: style.integer("round_rect_margin_height")?,
            rect_margin_height: style.integer("rect_margin_height")?,
            line_skip: style.integer("line_skip_height")?,
            corner_radius: style.integer("round_corner_radius")?,
            box_stroke_depth: style.number("box_stroke_depth")?,
            inner_stroke_depth: style.number("inner_stroke_depth")?,
            df_text_height_ratio: style.number("df_text_height_ratio")?,
            cartouche_text_height_ratio: style.number("cartouche_text_height_ratio")?,
            cartouche_height: cartouche_metrics.pixel_height(),
            attribute_height: provider.metrics(&attribute_font).pixel_height(),
            label_width: 0,
            cartouche_font,
        })
    }
}

impl Variant {
    /// Raw `(width, height)` before even rounding. Measures the label the
    /// variant draws into `frame` and sizes the attributes of the default
    /// variant on the way.
    pub(crate) fn compute_size<P: FontMetricsProvider>(
        self,
        frame: &mut Frame,
        labels: (&str, &str),
        attributes: &mut [Attribute],
        style: &Style,
        provider: &P,
    ) -> Result<(i64, i64)> {
        let (cartouche, df_label) = labels;
        let cartouche_metrics = provider.metrics(&frame.cartouche_font);
        let mw = frame.margin_width;
        match self {
            Variant::Df => {
                frame.label_width = cartouche_metrics.pixel_width(df_label);
                let side = (2 * mw + frame.label_width).max(2 * mw + frame.cartouche_height);
                Ok((side, side))
            }
            Variant::Inheritance => {
                frame.label_width = cartouche_metrics.pixel_width(cartouche);
                let side = 2 * mw + 2 * frame.cartouche_height;
                Ok((side, side))
            }
            Variant::Default => {
                frame.label_width = cartouche_metrics.pixel_width(cartouche);
                for attribute in attributes.iter_mut() {
                    attribute.calculate_size(style, provider)?;
                }
                let widest = attributes
                    .iter()
                    .filter_map(Attribute::width)
                    .fold(frame.label_width, i64::max);
                let rows = attributes.len().max(1) as i64;
                let width = 2 * mw + widest;
                let height = rows * (frame.attribute_height + frame.line_skip) - frame.line_skip
                    + 2 * frame.rect_margin_height
                    + 2 * frame.margin_height
                    + frame.cartouche_height;
                Ok((width, height))
            }
        }
    }
}

fn round_up_even(value: i64) -> i64 {
    value + value.rem_euclid(2)
}

impl Association {
    /// Computes the pixel geometry for `style` and the fonts of `provider`.
    ///
    /// Every derived value is recomputed; a failed pass leaves the
    /// association unsized.
    pub fn calculate_size<P: FontMetricsProvider>(&mut self, style: &Style, provider: &P) -> Result<()> {
        self.geometry = None;
        let mut frame = Frame::read(style, provider)?;
        let (width, height) = self.variant.compute_size(
            &mut frame,
            (self.cartouche.as_str(), self.df_label.as_str()),
            &mut self.attributes,
            style,
            provider,
        )?;
        for leg in &mut self.legs {
            leg.calculate_size(style, provider)?;
        }
        let geometry = Geometry {
            width: round_up_even(width),
            height: round_up_even(height),
            frame,
        };
        tracing::debug!(
            association = %self.name,
            variant = ?self.variant,
            width = geometry.width,
            height = geometry.height,
            "sized association"
        );
        self.geometry = Some(geometry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_even_values() {
        assert_eq!(round_up_even(4), 4);
        assert_eq!(round_up_even(5), 6);
        assert_eq!(round_up_even(0), 0);
    }
}
