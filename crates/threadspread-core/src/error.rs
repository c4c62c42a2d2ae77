use miette::Diagnostic;
use thiserror::Error;

/// Core error type for threadspread operations
#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    /// A resource quantity was present but unparsable
    #[error("Malformed CPU quantity: {value}")]
    #[diagnostic(
        code(threadspread::malformed_quantity),
        help("CPU quantities look like '2', '0.5', or '1500m'")
    )]
    MalformedQuantity { value: String },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a MalformedQuantity error
    pub fn malformed_quantity(value: impl Into<String>) -> Self {
        Self::MalformedQuantity {
            value: value.into(),
        }
    }
}
