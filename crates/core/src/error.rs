use thiserror::Error;

/// Rejections for malformed or incomplete input.
///
/// Raised synchronously before any side effect; a validation failure never
/// leaves a partial row behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Quantity must be a positive integer.
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i32),

    /// The supplied status string is not a known lifecycle state.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    /// A closed-enumeration column held an unrecognized value.
    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ValidationError::MissingField("file_url").to_string(),
            "missing required field: file_url"
        );
        assert_eq!(
            ValidationError::NonPositiveQuantity(0).to_string(),
            "quantity must be positive, got 0"
        );
    }
}
