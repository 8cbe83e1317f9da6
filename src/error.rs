use thiserror::Error;

pub type Result<T> = std::result::Result<T, DojoError>;

// Missing records are not errors: lookups return Ok(None) and the caller
// decides how to report it.
#[derive(Debug, Error)]
pub enum DojoError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("{0} must not be empty")]
    MissingIdentifier(&'static str),

    #[error("quiz score {0} out of range (expected 0-100)")]
    ScoreOutOfRange(f64),

    #[error("council readiness {0} out of range (expected 0-1)")]
    ReadinessOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_out_of_range_names_the_value() {
        let msg = DojoError::ScoreOutOfRange(120.0).to_string();
        assert!(msg.contains("120"));
        assert!(msg.contains("0-100"));
    }

    #[test]
    fn missing_identifier_names_the_field() {
        let msg = DojoError::MissingIdentifier("user_id").to_string();
        assert!(msg.contains("user_id"));
    }

    #[test]
    fn storage_errors_convert() {
        let err: DojoError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DojoError::Storage(_)));
    }
}
