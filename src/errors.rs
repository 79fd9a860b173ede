use std::fmt;

/// Transport-layer errors produced by the HTTP helpers.
#[derive(Clone, Debug)]
pub enum AppError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(message) => write!(formatter, "Config error: {message}"),
            AppError::Network(message) => write!(formatter, "Network error: {message}"),
            AppError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AppError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            AppError::Parse(message) => write!(formatter, "Response error: {message}"),
            AppError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
        }
    }
}

impl std::error::Error for AppError {}

/// Action-layer errors surfaced by the session manager. The message in
/// `Rejected` is already normalized for direct display; raw transport
/// errors never cross this boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The backend rejected the action; carries a user-facing message.
    Rejected(String),
    /// The sign-in call succeeded but no session was observable afterwards,
    /// which points at a cookie-propagation problem rather than bad
    /// credentials.
    SessionNotEstablished,
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected(message) => write!(formatter, "{message}"),
            AuthError::SessionNotEstablished => {
                write!(formatter, "Signin succeeded but session not established in client")
            }
        }
    }
}

impl std::error::Error for AuthError {}
