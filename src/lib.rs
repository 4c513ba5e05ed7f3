pub mod assoc_ast;
pub mod assoc_layout;
pub mod assoc_parser;
pub mod assoc_renderer;
pub mod attribute;
pub mod descriptor;
pub mod error;
pub mod leg;
pub mod metrics;
pub mod style;

pub use assoc_ast::{Association, Cardinality, Direction, Kind, Params, Variant};
pub use attribute::{Attribute, split_attributes};
pub use descriptor::{Axis, BinOp, Binding, ColorRef, Corners, Expr, Instruction, Item, Scope};
pub use error::{Error, Result};
pub use leg::Leg;
pub use metrics::{FontMetrics, FontMetricsProvider, MonospaceFonts};
pub use style::{FontSpec, Style};

/// Parses, sizes and describes a single clause.
pub fn describe_clause<P: FontMetricsProvider>(
    clause: &str,
    params: &Params,
    style: &Style,
    provider: &P,
) -> Result<Vec<Item>> {
    let mut association = Association::new(clause, params)?;
    association.calculate_size(style, provider)?;
    association.describe()
}

/// Parses and sizes every association clause of `text`, one per line.
///
/// Blank lines and lines starting with `%` are skipped.
pub fn layout_clauses<P: FontMetricsProvider>(
    text: &str,
    params: &Params,
    style: &Style,
    provider: &P,
) -> Result<Vec<Association>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('%'))
        .map(|line| -> Result<Association> {
            let mut association = Association::new(line, params)?;
            association.calculate_size(style, provider)?;
            Ok(association)
        })
        .collect()
}
