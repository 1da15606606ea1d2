/// Structured outcome of a failed number check
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Codes the messaging gateway uses for numbers that are definitively not reachable
pub const TERMINAL_INVALID_CODES: [&str; 4] = [
    "ERR_WAPP_INVALID_CONTACT",
    "ERR_WAPP_CHECK_CONTACT",
    "ERR_NUMBER_NOT_ON_WHATSAPP",
    "ERR_INVALID_NUMBER",
];

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberCheckError {
    /// The number is authoritatively invalid; the row is resolved as `false`
    #[error("Invalid number ({code})")]
    InvalidNumber { code: String },

    /// The check could not complete; the row stays unresolved
    #[error("Number check failed ({code}): {message}")]
    Transient { code: String, message: String },
}

impl NumberCheckError {
    pub fn from_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        if TERMINAL_INVALID_CODES.contains(&code.as_str()) {
            NumberCheckError::InvalidNumber { code }
        } else {
            NumberCheckError::Transient {
                code,
                message: message.into(),
            }
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        NumberCheckError::Transient {
            code: "TRANSIENT".to_string(),
            message: message.into(),
        }
    }

    pub fn is_terminal_invalid(&self) -> bool {
        matches!(self, NumberCheckError::InvalidNumber { .. })
    }

    pub fn code(&self) -> &str {
        match self {
            NumberCheckError::InvalidNumber { code } | NumberCheckError::Transient { code, .. } => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_are_terminal() {
        for code in TERMINAL_INVALID_CODES {
            let err = NumberCheckError::from_code(code, "whatever");
            assert!(err.is_terminal_invalid(), "{} should be terminal", code);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_unknown_codes_are_transient() {
        let err = NumberCheckError::from_code("ETIMEDOUT", "socket hang up");
        assert!(!err.is_terminal_invalid());
        assert_eq!(err.to_string(), "Number check failed (ETIMEDOUT): socket hang up");

        // Matching is exact; localized text never decides the outcome
        let err = NumberCheckError::from_code("err_wapp_invalid_contact", "");
        assert!(!err.is_terminal_invalid());
    }
}
