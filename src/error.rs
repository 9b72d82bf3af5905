//! Crate-wide error type.
//!
//! Every error carries the process exit code it should map to:
//!
//! - `2`: bad configuration or unreadable input
//! - `3`: not enough data to continue
//! - `4`: data-quality or numerical failure (fetch, rank deficiency, ...)

/// Exit code for configuration and input errors.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for "not enough data" errors.
pub const EXIT_NO_DATA: u8 = 3;
/// Exit code for fetch, data-quality and numerical errors.
pub const EXIT_DATA: u8 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_DATA, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    /// Prefix the message with `context`, keeping the exit code.
    pub fn with_context(self, context: &str) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{context}: {}", self.message),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
