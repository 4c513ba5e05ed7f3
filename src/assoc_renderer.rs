use crate::assoc_ast::{Association, Variant};
use crate::assoc_layout::Geometry;
use crate::attribute::Attribute;
use crate::descriptor::*;
use crate::error::{Error, Result};

const TRIANGLE_ALTITUDE: f64 = 0.866_025_403_784_438_6; // sqrt(3) / 2
const INCIRCLE_RADIUS: f64 = 0.288_675_134_594_812_9; // 1 / sqrt(12)

fn x_plus(offset: impl Into<f64>) -> Expr {
    Expr::symbol("x").plus(offset.into())
}

fn y_plus(offset: impl Into<f64>) -> Expr {
    Expr::symbol("y").plus(offset.into())
}

fn stroke_depth(depth: f64) -> Item {
    Instruction::StrokeDepth { depth }.into()
}

fn stroke_color(name: &str) -> Item {
    Instruction::StrokeColor {
        color: ColorRef::new(name),
    }
    .into()
}

fn fill_color(name: &str) -> Item {
    Instruction::FillColor {
        color: ColorRef::new(name),
    }
    .into()
}

fn cartouche_text(text: &str, g: &Geometry, x: Expr, y: Expr) -> Item {
    Instruction::Text {
        text: text.to_string(),
        color: ColorRef::new("association_cartouche_text_color"),
        x,
        y,
        family: g.frame.cartouche_font.family.clone(),
        size: g.frame.cartouche_font.size,
        note: None,
    }
    .into()
}

impl Variant {
    /// Shape items of one association, between its `begin` and `end` markers.
    pub(crate) fn build_descriptor(
        self,
        g: &Geometry,
        labels: (&str, &str),
        attributes: &[Attribute],
    ) -> Result<Vec<Item>> {
        let (cartouche, df_label) = labels;
        match self {
            Variant::Df => Ok(df_shape(g, df_label)),
            Variant::Inheritance => Ok(inheritance_shape(g, cartouche)),
            Variant::Default => box_shape(g, cartouche, attributes),
        }
    }
}

fn df_shape(g: &Geometry, label: &str) -> Vec<Item> {
    let f = &g.frame;
    let baseline = round1(
        f.margin_height as f64 - g.height as f64 / 2.0
            + f.df_text_height_ratio * f.cartouche_height as f64,
    );
    vec![
        stroke_depth(f.box_stroke_depth),
        stroke_color("association_stroke_color"),
        fill_color("association_cartouche_color"),
        Instruction::Circle {
            cx: Expr::symbol("x"),
            cy: Expr::symbol("y"),
            r: floor_half(g.width),
        }
        .into(),
        cartouche_text(label, g, x_plus(floor_half(-f.label_width) as f64), y_plus(baseline)),
    ]
}

fn inheritance_shape(g: &Geometry, cartouche: &str) -> Vec<Item> {
    let f = &g.frame;
    let w = g.width as f64;
    let half = floor_half(g.width) as f64;
    vec![
        stroke_depth(f.box_stroke_depth),
        stroke_color("association_stroke_color"),
        fill_color("association_cartouche_color"),
        Instruction::Triangle {
            x1: Expr::symbol("x"),
            y1: Expr::symbol("y").minus((TRIANGLE_ALTITUDE - INCIRCLE_RADIUS) * w),
            x2: Expr::symbol("x").minus(half),
            y2: y_plus(INCIRCLE_RADIUS * w),
            x3: x_plus(half),
            y3: y_plus(INCIRCLE_RADIUS * w),
        }
        .into(),
        cartouche_text(
            cartouche,
            g,
            x_plus(floor_half(-f.label_width) as f64),
            y_plus(f.cartouche_height.div_euclid(3) as f64),
        ),
    ]
}

fn box_shape(g: &Geometry, cartouche: &str, attributes: &[Attribute]) -> Result<Vec<Item>> {
    let f = &g.frame;
    let (w, h) = (g.width, g.height);
    let left = floor_half(-w) as f64;
    let top = floor_half(-h) as f64;
    let band = f.cartouche_height + f.margin_height + f.rect_margin_height;
    let divider = (band + floor_half(-h)) as f64;

    let mut items = vec![
        stroke_depth(0.0),
        stroke_color("association_cartouche_color"),
        fill_color("association_cartouche_color"),
        Instruction::RoundedRectangle {
            corners: Corners::Top,
            radius: f.corner_radius,
            x: x_plus(left),
            y: y_plus(top),
            w,
            h: band,
        }
        .into(),
        stroke_color("association_color"),
        fill_color("association_color"),
        Instruction::RoundedRectangle {
            corners: Corners::Bottom,
            radius: f.corner_radius,
            x: x_plus(left),
            y: y_plus(divider),
            w,
            h: h - band,
        }
        .into(),
        fill_color("transparent_color"),
        stroke_color("association_stroke_color"),
        stroke_depth(f.box_stroke_depth),
        Instruction::RoundedRectangle {
            corners: Corners::All,
            radius: f.corner_radius,
            x: x_plus(left),
            y: y_plus(top),
            w,
            h,
        }
        .into(),
        stroke_depth(f.inner_stroke_depth),
        Instruction::Line {
            x0: x_plus(left),
            y0: y_plus(divider),
            x1: x_plus(floor_half(w) as f64),
            y1: y_plus(divider),
        }
        .into(),
        cartouche_text(
            cartouche,
            g,
            x_plus(floor_half(-f.label_width) as f64),
            y_plus(round1(
                -(h as f64) / 2.0
                    + f.rect_margin_height as f64
                    + f.cartouche_text_height_ratio * f.cartouche_height as f64,
            )),
        ),
    ];

    let dx = f.margin_width + floor_half(-w);
    let mut dy = f.margin_height + f.cartouche_height + 2 * f.rect_margin_height + floor_half(-h);
    for attribute in attributes {
        items.extend(attribute.describe(dx, dy)?);
        dy += f.attribute_height + f.line_skip;
    }
    Ok(items)
}

impl Association {
    /// Drawing descriptor: legs first, then the shape scoped under
    /// `association-<name>`. Fails if the association was never sized.
    pub fn describe(&self) -> Result<Vec<Item>> {
        let g = self.geometry.as_ref().ok_or_else(|| Error::NotSized {
            element: format!("association `{}`", self.name),
        })?;
        let mut items = vec![
            Item::Comment(format!("Association {}", self.name)),
            Item::Env(vec![
                Binding::new("x", &self.name, Axis::X),
                Binding::new("y", &self.name, Axis::Y),
            ]),
        ];
        for leg in &self.legs {
            items.extend(leg.describe()?);
        }
        items.push(Item::Begin {
            id: format!("association-{}", self.name),
        });
        items.extend(self.variant.build_descriptor(
            g,
            (self.cartouche.as_str(), self.df_label.as_str()),
            &self.attributes,
        )?);
        items.push(Item::End);
        Ok(items)
    }
}
