use std::error::Error;
use std::fmt;
use std::sync::PoisonError;

#[derive(Debug)]
pub enum RustyRelayError {
    // Registry errors
    RegistryLock(String),

    // Connection errors
    ConnectionError(String),
}

impl fmt::Display for RustyRelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryLock(msg) => write!(f, "Registry lock error: {}", msg),
            Self::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
        }
    }
}

impl Error for RustyRelayError {}

// Converting from PoisonError to facilitate poisoned mutex handling
impl<T> From<PoisonError<T>> for RustyRelayError {
    fn from(err: PoisonError<T>) -> Self {
        RustyRelayError::RegistryLock(format!("Mutex poisoned: {}", err))
    }
}

impl From<std::io::Error> for RustyRelayError {
    fn from(err: std::io::Error) -> Self {
        RustyRelayError::ConnectionError(err.to_string())
    }
}

// Generic result type for RustyRelay
pub type Result<T> = std::result::Result<T, RustyRelayError>;
