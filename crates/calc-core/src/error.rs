use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("math error: {0}")]
    Domain(String),

    #[error("could not process: {0}")]
    Unsupported(String),

    #[error("dimension mismatch: {0}")]
    Dimension(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CalcError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// True for errors caused by the caller's input rather than by storage.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Domain(_) | Self::Unsupported(_) | Self::Dimension(_)
        )
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(CalcError::validation("x").is_user_error());
        assert!(CalcError::domain("x").is_user_error());
        assert!(CalcError::Dimension("2x3 vs 2x2".into()).is_user_error());
        assert!(!CalcError::Database("locked".into()).is_user_error());
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!CalcError::from(bad_json).is_user_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CalcError::unsupported("sin(x)").to_string(),
            "could not process: sin(x)"
        );
        assert_eq!(
            CalcError::domain("division by zero").to_string(),
            "math error: division by zero"
        );
    }
}
