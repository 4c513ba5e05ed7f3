//! Renderer-agnostic drawing descriptor.
//!
//! A descriptor is a flat list of [`Item`]s. Coordinates that depend on the
//! final placement of diagram elements are [`Expr`] trees over symbols bound
//! by [`Item::Env`] declarations; a renderer resolves them with a [`Scope`]
//! once the layout pass has placed every element.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(f64),
    Symbol(String),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
        }
    }
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    fn binary(self, op: BinOp, rhs: impl Into<Expr>) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn plus(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinOp::Add, rhs)
    }

    pub fn minus(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinOp::Sub, rhs)
    }

    pub fn times(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinOp::Mul, rhs)
    }

    pub fn over(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinOp::Div, rhs)
    }

    /// Evaluates the expression, resolving symbols through `lookup`.
    pub fn eval<F>(&self, lookup: &F) -> Result<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Expr::Literal(v) => Ok(*v),
            Expr::Symbol(name) => lookup(name).ok_or_else(|| Error::UnboundSymbol {
                symbol: name.clone(),
            }),
            Expr::Binary { op, lhs, rhs } => Ok(op.apply(lhs.eval(lookup)?, rhs.eval(lookup)?)),
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                let wrap = prec < parent;
                if wrap {
                    write!(f, "(")?;
                }
                lhs.fmt_with(f, prec)?;
                write!(f, " {} ", op.symbol())?;
                // right operand binds tighter so `a - (b + c)` keeps its parens
                rhs.fmt_with(f, prec + 1)?;
                if wrap {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, 0)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Literal(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Literal(value as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

/// Declares `symbol` as the resolved center coordinate of `element` on `axis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub symbol: String,
    pub element: String,
    pub axis: Axis,
}

impl Binding {
    pub fn new(symbol: &str, element: &str, axis: Axis) -> Self {
        Self {
            symbol: symbol.to_string(),
            element: element.to_string(),
            axis,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self.axis {
            Axis::X => "cx",
            Axis::Y => "cy",
        };
        write!(f, "{} = {}[{}]", self.symbol, axis, self.element)
    }
}

/// Named palette slot, resolved by the renderer's color scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorRef(pub String);

impl ColorRef {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Corners {
    All,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum Instruction {
    StrokeDepth {
        depth: f64,
    },
    StrokeColor {
        color: ColorRef,
    },
    FillColor {
        color: ColorRef,
    },
    Circle {
        cx: Expr,
        cy: Expr,
        r: i64,
    },
    Triangle {
        x1: Expr,
        y1: Expr,
        x2: Expr,
        y2: Expr,
        x3: Expr,
        y3: Expr,
    },
    /// `Top` and `Bottom` round only the corners on that side.
    RoundedRectangle {
        corners: Corners,
        radius: i64,
        x: Expr,
        y: Expr,
        w: i64,
        h: i64,
    },
    Line {
        x0: Expr,
        y0: Expr,
        x1: Expr,
        y1: Expr,
    },
    /// Quadratic Bezier from `(x0, y0)` to `(x1, y1)` through control `(cx, cy)`.
    Curve {
        x0: Expr,
        y0: Expr,
        cx: Expr,
        cy: Expr,
        x1: Expr,
        y1: Expr,
    },
    Arrow {
        tip_x: Expr,
        tip_y: Expr,
        tail_x: Expr,
        tail_y: Expr,
    },
    Text {
        text: String,
        color: ColorRef,
        x: Expr,
        y: Expr,
        family: String,
        size: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    Comment(String),
    Env(Vec<Binding>),
    Begin { id: String },
    End,
    Draw(Instruction),
}

impl From<Instruction> for Item {
    fn from(instruction: Instruction) -> Self {
        Item::Draw(instruction)
    }
}

/// Symbol values visible at one point of a descriptor walk.
///
/// Bindings accumulate in item order: a later `Env` rebinding a symbol
/// shadows the earlier value for every item that follows it.
pub struct Scope<'a> {
    placements: &'a HashMap<String, (f64, f64)>,
    values: HashMap<String, f64>,
}

impl<'a> Scope<'a> {
    pub fn new(placements: &'a HashMap<String, (f64, f64)>) -> Self {
        Self {
            placements,
            values: HashMap::new(),
        }
    }

    pub fn bind(&mut self, bindings: &[Binding]) -> Result<()> {
        for binding in bindings {
            let (cx, cy) = self
                .placements
                .get(&binding.element)
                .copied()
                .ok_or_else(|| Error::UnplacedElement {
                    element: binding.element.clone(),
                })?;
            let value = match binding.axis {
                Axis::X => cx,
                Axis::Y => cy,
            };
            self.values.insert(binding.symbol.clone(), value);
        }
        Ok(())
    }

    /// Feeds one descriptor item, picking up its bindings if it is an `Env`.
    pub fn visit(&mut self, item: &Item) -> Result<()> {
        if let Item::Env(bindings) = item {
            self.bind(bindings)?;
        }
        Ok(())
    }

    pub fn eval(&self, expr: &Expr) -> Result<f64> {
        expr.eval(&|name: &str| self.values.get(name).copied())
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Floor division by two, matching how odd pixel sizes split around a center.
pub(crate) fn floor_half(value: i64) -> i64 {
    value.div_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placements() -> HashMap<String, (f64, f64)> {
        HashMap::from([("R".to_string(), (100.0, 50.0)), ("A".to_string(), (10.0, 20.0))])
    }

    #[test]
    fn display_keeps_needed_parentheses() {
        let e = Expr::symbol("x").minus(Expr::symbol("ex").plus(2.0)).times(0.5);
        assert_eq!(e.to_string(), "(x - (ex + 2)) * 0.5");
        let simple = Expr::symbol("x").plus(-3.0);
        assert_eq!(simple.to_string(), "x + -3");
    }

    #[test]
    fn eval_resolves_symbols() {
        let e = Expr::symbol("x").plus(Expr::symbol("y").times(2.0)).over(4.0);
        let v = e
            .eval(&|s: &str| match s {
                "x" => Some(2.0),
                "y" => Some(3.0),
                _ => None,
            })
            .unwrap();
        assert_eq!(v, 2.0);
    }

    #[test]
    fn eval_unbound_symbol_fails() {
        let err = Expr::symbol("z").eval(&|_: &str| None).unwrap_err();
        assert!(matches!(err, Error::UnboundSymbol { ref symbol } if symbol == "z"));
    }

    #[test]
    fn scope_later_env_shadows_earlier() {
        let placements = placements();
        let mut scope = Scope::new(&placements);
        scope
            .visit(&Item::Env(vec![Binding::new("x", "R", Axis::X)]))
            .unwrap();
        assert_eq!(scope.eval(&Expr::symbol("x")).unwrap(), 100.0);
        scope
            .visit(&Item::Env(vec![Binding::new("x", "A", Axis::X)]))
            .unwrap();
        assert_eq!(scope.eval(&Expr::symbol("x")).unwrap(), 10.0);
    }

    #[test]
    fn scope_unknown_element_fails() {
        let placements = placements();
        let mut scope = Scope::new(&placements);
        let binding = Binding::new("ey", "MISSING", Axis::Y);
        assert_eq!(binding.to_string(), "ey = cy[MISSING]");
        let err = scope.bind(&[binding]).unwrap_err();
        assert!(
            matches!(err, Error::UnplacedElement { ref element } if element == "MISSING"),
            "got: {err}"
        );
    }

    #[test]
    fn floor_half_rounds_down() {
        assert_eq!(floor_half(7), 3);
        assert_eq!(floor_half(-7), -4);
        assert_eq!(round1(1.26), 1.3);
    }

    #[test]
    fn instruction_serializes_with_key_tag() {
        let item: Item = Instruction::StrokeDepth { depth: 1.5 }.into();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["draw"]["key"], "stroke_depth");
        assert_eq!(json["draw"]["depth"], 1.5);
    }
}
