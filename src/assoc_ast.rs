use serde::Serialize;

use crate::assoc_layout::Geometry;
use crate::assoc_parser;
use crate::attribute::Attribute;
use crate::error::Result;
use crate::leg::Leg;

/// Clause-level options, passed explicitly to every constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Cartouche that turns an association into a dependent-entity marker.
    pub df_label: String,
    /// Cardinality template; `{min}` and `{max}` are substituted.
    pub card_format: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            df_label: "DF".to_string(),
            card_format: "{min},{max}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Association,
    Inheritance,
}

/// Rendering strategy, chosen once when the clause is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Df,
    Inheritance,
    Default,
}

impl Variant {
    pub fn classify(cartouche: &str, is_inheritance: bool, df_label: &str) -> Self {
        if cartouche == df_label {
            Variant::Df
        } else if is_inheritance {
            Variant::Inheritance
        } else {
            Variant::Default
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            Variant::Inheritance => Kind::Inheritance,
            Variant::Df | Variant::Default => Kind::Association,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `>`: towards the entity.
    Forward,
    /// `<`: towards the association.
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    /// Two characters (`11`, `0N`, `XX`, ...) or the identifying `_11`.
    pub code: String,
    pub direction: Option<Direction>,
    pub note: Option<String>,
}

impl Cardinality {
    pub fn is_identifying(&self) -> bool {
        self.code == "_11"
    }

    pub fn is_hidden(&self) -> bool {
        self.code == "XX"
    }
}

#[derive(Debug, Clone)]
pub struct Association {
    pub(crate) name: String,
    pub(crate) cartouche: String,
    pub(crate) is_inheritance: bool,
    pub(crate) variant: Variant,
    pub(crate) df_label: String,
    pub(crate) legs: Vec<Leg>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) geometry: Option<Geometry>,
}

impl Association {
    /// Parses one clause; the association is either fully valid or not built.
    pub fn new(clause: &str, params: &Params) -> Result<Self> {
        assoc_parser::parse_clause(clause, params)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cartouche(&self) -> &str {
        &self.cartouche
    }

    pub fn is_inheritance(&self) -> bool {
        self.is_inheritance
    }

    pub fn kind(&self) -> Kind {
        self.variant.kind()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Even pixel width, `None` until [`Association::calculate_size`] ran.
    pub fn width(&self) -> Option<i64> {
        self.geometry.as_ref().map(|g| g.width)
    }

    pub fn height(&self) -> Option<i64> {
        self.geometry.as_ref().map(|g| g.height)
    }

    pub fn leg_identifiers(&self) -> impl Iterator<Item = &str> + '_ {
        self.legs.iter().map(Leg::identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_precedence() {
        assert_eq!(Variant::classify("DF", true, "DF"), Variant::Df);
        assert_eq!(Variant::classify("DF", false, "DF"), Variant::Df);
        assert_eq!(Variant::classify("Sub", true, "DF"), Variant::Inheritance);
        assert_eq!(Variant::classify("R", false, "DF"), Variant::Default);
        assert_eq!(Variant::classify("DF", false, "CIF"), Variant::Default);
    }

    #[test]
    fn kind_follows_variant() {
        assert_eq!(Variant::Df.kind(), Kind::Association);
        assert_eq!(Variant::Inheritance.kind(), Kind::Inheritance);
        assert_eq!(Variant::Default.kind(), Kind::Association);
    }

    #[test]
    fn default_params() {
        let params = Params::default();
        assert_eq!(params.df_label, "DF");
        assert_eq!(params.card_format, "{min},{max}");
    }
}
