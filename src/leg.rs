use crate::assoc_ast::{Cardinality, Direction, Params};
use crate::descriptor::{Axis, Binding, ColorRef, Expr, Instruction, Item};
use crate::error::{Error, Result};
use crate::metrics::{FontMetrics, FontMetricsProvider};
use crate::style::{FontSpec, Style};

#[derive(Debug, Clone)]
struct LegGeometry {
    stroke_depth: f64,
    card_margin: f64,
    bend_ratio: f64,
    card_font: FontSpec,
    card_width: i64,
    card_height: i64,
}

/// Connection between an association (symbols `x`, `y`) and one entity
/// (symbols `ex`, `ey`).
#[derive(Debug, Clone)]
pub struct Leg {
    association: String,
    entity: String,
    cardinality: Cardinality,
    card_label: Option<String>,
    identifier: String,
    spin: f64,
    geometry: Option<LegGeometry>,
}

impl Leg {
    pub fn new(association: &str, cardinality: Cardinality, entity: &str, params: &Params) -> Self {
        let card_label = card_label(&cardinality, &params.card_format);
        Self {
            association: association.to_string(),
            entity: entity.to_string(),
            cardinality,
            card_label,
            identifier: format!("{association},{entity}"),
            spin: 0.0,
            geometry: None,
        }
    }

    /// Tells apart legs reaching the same entity; `occurrence` counts from 0.
    pub(crate) fn mark_occurrence(&mut self, occurrence: usize) {
        self.identifier = format!("{},{},{occurrence}", self.association, self.entity);
    }

    /// Bend in `[-1, 1]`; zero draws a straight leg.
    pub fn set_spin(&mut self, spin: f64) {
        self.spin = spin;
    }

    pub fn spin(&self) -> f64 {
        self.spin
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn cardinality(&self) -> &Cardinality {
        &self.cardinality
    }

    /// Displayed cardinality, `None` when hidden with `XX`.
    pub fn card_label(&self) -> Option<&str> {
        self.card_label.as_deref()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Pixel size of the cardinality label, for the placement solver.
    pub fn card_size(&self) -> Option<(i64, i64)> {
        self.geometry.as_ref().map(|g| (g.card_width, g.card_height))
    }

    pub fn calculate_size<P: FontMetricsProvider>(&mut self, style: &Style, provider: &P) -> Result<()> {
        self.geometry = None;
        let card_font = style.font("card_font")?;
        let metrics = provider.metrics(&card_font);
        let card_width = self
            .card_label
            .as_deref()
            .map_or(0, |label| metrics.pixel_width(label));
        let geometry = LegGeometry {
            stroke_depth: style.number("leg_stroke_depth")?,
            card_margin: style.number("card_margin")?,
            bend_ratio: style.number("leg_bend_ratio")?,
            card_width,
            card_height: metrics.pixel_height(),
            card_font,
        };
        tracing::trace!(leg = %self.identifier, card_width, spin = self.spin, "sized leg");
        self.geometry = Some(geometry);
        Ok(())
    }

    pub fn describe(&self) -> Result<Vec<Item>> {
        let g = self.geometry.as_ref().ok_or_else(|| Error::NotSized {
            element: format!("leg `{}`", self.identifier),
        })?;
        let x = || Expr::symbol("x");
        let y = || Expr::symbol("y");
        let ex = || Expr::symbol("ex");
        let ey = || Expr::symbol("ey");

        let mut items = vec![
            Item::Env(vec![
                Binding::new("ex", &self.entity, Axis::X),
                Binding::new("ey", &self.entity, Axis::Y),
            ]),
            Instruction::StrokeDepth {
                depth: g.stroke_depth,
            }
            .into(),
            Instruction::StrokeColor {
                color: ColorRef::new("leg_stroke_color"),
            }
            .into(),
        ];

        let (mid_x, mid_y) = if self.spin == 0.0 {
            items.push(
                Instruction::Line {
                    x0: x(),
                    y0: y(),
                    x1: ex(),
                    y1: ey(),
                }
                .into(),
            );
            (x().plus(ex()).over(2.0), y().plus(ey()).over(2.0))
        } else {
            // control point: chord midpoint pushed along the chord's normal
            let bend = self.spin * g.bend_ratio;
            let cx = x().plus(ex()).over(2.0).minus(ey().minus(y()).times(bend));
            let cy = y().plus(ey()).over(2.0).plus(ex().minus(x()).times(bend));
            let mid_x = x().plus(cx.clone().times(2.0)).plus(ex()).over(4.0);
            let mid_y = y().plus(cy.clone().times(2.0)).plus(ey()).over(4.0);
            items.push(
                Instruction::Curve {
                    x0: x(),
                    y0: y(),
                    cx,
                    cy,
                    x1: ex(),
                    y1: ey(),
                }
                .into(),
            );
            (mid_x, mid_y)
        };

        if let Some(direction) = self.cardinality.direction {
            let (tail_x, tail_y) = match direction {
                Direction::Forward => (x(), y()),
                Direction::Backward => (ex(), ey()),
            };
            items.push(
                Instruction::Arrow {
                    tip_x: mid_x.clone(),
                    tip_y: mid_y.clone(),
                    tail_x,
                    tail_y,
                }
                .into(),
            );
        }

        if let Some(label) = &self.card_label {
            items.push(
                Instruction::Text {
                    text: label.clone(),
                    color: ColorRef::new("card_text_color"),
                    x: mid_x.plus(g.card_margin),
                    y: mid_y.minus(g.card_margin),
                    family: g.card_font.family.clone(),
                    size: g.card_font.size,
                    note: self.cardinality.note.clone(),
                }
                .into(),
            );
        }
        Ok(items)
    }
}

fn card_label(cardinality: &Cardinality, card_format: &str) -> Option<String> {
    if cardinality.is_hidden() {
        return None;
    }
    let code = cardinality.code.trim_start_matches('_');
    let mut chars = code.chars();
    let min = chars.next().map(String::from).unwrap_or_default();
    let max: String = chars.collect();
    let label = card_format.replace("{min}", &min).replace("{max}", &max);
    if cardinality.is_identifying() {
        Some(format!("({label})"))
    } else {
        Some(label)
    }
}
