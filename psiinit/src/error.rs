//! Error types for wavefunction initialization

use std::fmt;

use control::ControlError;
use cubspl::SplineError;
use dwmpi::CommError;

#[derive(Debug, Clone, PartialEq)]
pub enum PsiInitError {
    /// orbital file does not exist or cannot be opened
    FileNotFound { path: String },
    /// malformed orbital file
    Format(String),
    /// invalid numeric input, unknown atom type
    Value(String),
    /// argument outside the domain of a function
    Domain(String),
    /// array sizes that do not fit together
    Dimension(String),
    /// lookup outside an enumerated range
    Key(String),
    Config(String),
    Comm(String),
}

impl fmt::Display for PsiInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsiInitError::FileNotFound { path } => write!(f, "orbital file not found: '{}'", path),
            PsiInitError::Format(msg) => write!(f, "format error: {}", msg),
            PsiInitError::Value(msg) => write!(f, "value error: {}", msg),
            PsiInitError::Domain(msg) => write!(f, "domain error: {}", msg),
            PsiInitError::Dimension(msg) => write!(f, "dimension error: {}", msg),
            PsiInitError::Key(msg) => write!(f, "key error: {}", msg),
            PsiInitError::Config(msg) => write!(f, "configuration error: {}", msg),
            PsiInitError::Comm(msg) => write!(f, "communication error: {}", msg),
        }
    }
}

impl std::error::Error for PsiInitError {}

impl From<ControlError> for PsiInitError {
    fn from(e: ControlError) -> Self {
        PsiInitError::Config(e.to_string())
    }
}

impl From<CommError> for PsiInitError {
    fn from(e: CommError) -> Self {
        PsiInitError::Comm(e.to_string())
    }
}

impl From<SplineError> for PsiInitError {
    fn from(e: SplineError) -> Self {
        PsiInitError::Value(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PsiInitError>;

impl PsiInitError {
    // (tag, payload) so that an error raised on the reading rank can be
    // rebuilt unchanged on the others
    pub(crate) fn to_wire(&self) -> (u8, String) {
        match self {
            PsiInitError::FileNotFound { path } => (0, path.clone()),
            PsiInitError::Format(s) => (1, s.clone()),
            PsiInitError::Value(s) => (2, s.clone()),
            PsiInitError::Domain(s) => (3, s.clone()),
            PsiInitError::Dimension(s) => (4, s.clone()),
            PsiInitError::Key(s) => (5, s.clone()),
            PsiInitError::Config(s) => (6, s.clone()),
            PsiInitError::Comm(s) => (7, s.clone()),
        }
    }

    pub(crate) fn from_wire(tag: u8, payload: String) -> PsiInitError {
        match tag {
            0 => PsiInitError::FileNotFound { path: payload },
            1 => PsiInitError::Format(payload),
            2 => PsiInitError::Value(payload),
            3 => PsiInitError::Domain(payload),
            4 => PsiInitError::Dimension(payload),
            5 => PsiInitError::Key(payload),
            6 => PsiInitError::Config(payload),
            _ => PsiInitError::Comm(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip_keeps_variant() {
        let errors = vec![
            PsiInitError::FileNotFound {
                path: "Si.orb".to_string(),
            },
            PsiInitError::Format("x".to_string()),
            PsiInitError::Key("y".to_string()),
            PsiInitError::Comm("z".to_string()),
        ];

        for e in errors {
            let (tag, payload) = e.to_wire();
            assert_eq!(PsiInitError::from_wire(tag, payload), e);
        }
    }

    #[test]
    fn test_conversions() {
        let e: PsiInitError = SplineError::TooFewPoints { got: 1, need: 2 }.into();
        assert!(matches!(e, PsiInitError::Value(_)));

        let e: PsiInitError = CommError::Poisoned.into();
        assert!(matches!(e, PsiInitError::Comm(_)));
    }
}
