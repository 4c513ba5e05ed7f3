#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("clause `{clause}` has no legs (expected `name, card entity, ...`)")]
    MalformedClause { clause: String },

    #[error("missing cardinalities in leg `{leg}` of association `{association}`")]
    MalformedLeg { leg: String, association: String },

    #[error("invalid attribute syntax near `{fragment}`: {reason}")]
    InvalidAttributeSyntax { fragment: String, reason: String },

    #[error("style key `{key}` is missing")]
    MissingStyleKey { key: String },

    #[error("style key `{key}` must be {expected}")]
    InvalidStyleValue { key: String, expected: &'static str },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{element}` must be sized before it is described")]
    NotSized { element: String },

    #[error("symbol `{symbol}` is not bound in the current scope")]
    UnboundSymbol { symbol: String },

    #[error("element `{element}` has no placement")]
    UnplacedElement { element: String },
}

pub type Result<T> = std::result::Result<T, Error>;
