//! Form component errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown input type `{0}`")]
    UnknownInputType(String),

    #[error("invalid message catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}
