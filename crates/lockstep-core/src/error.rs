//! Error types for lockstep-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid tick rate: {0} Hz")]
    InvalidTickRate(f64),

    #[error("Invalid port: {0}")]
    InvalidPort(usize),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::InvalidTickRate(0.0).to_string(), "Invalid tick rate: 0 Hz");
        assert_eq!(Error::InvalidPort(2).to_string(), "Invalid port: 2");
    }
}
