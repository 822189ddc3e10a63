use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid width must be positive")]
    ZeroWidth,
    #[error("grid height must be positive")]
    ZeroHeight,
    #[error("density {0} must be between 0.0 and 1.0")]
    Density(f64),
    #[error("unknown boundary condition `{0}` (expected finite, toroidal or infinite)")]
    Boundary(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RleError {
    #[error("pattern text is empty")]
    Empty,
    #[error("invalid header line `{0}`")]
    Header(String),
    #[error("no pattern data after header")]
    MissingData,
    #[error("invalid dimensions line `{0}`")]
    Dimensions(String),
    #[error("invalid character `{0}` in pattern data")]
    Character(char),
    #[error("pattern data exceeds declared width {0}")]
    TooWide(usize),
    #[error("pattern data exceeds declared height {0}")]
    TooTall(usize),
    #[error("pattern data must end with `!`")]
    Unterminated,
}
