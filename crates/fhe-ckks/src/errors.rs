use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error in the underlying mathematical library was
    /// encountered.
    #[error("{0}")]
    MathError(fhe_math::Error),

    /// Indicates a serialization error.
    #[error("Serialization error")]
    SerializationError,

    /// Indicates that an object was bound to different parameters than the
    /// ones it is used with.
    #[error("Parameters mismatch: object belongs to a different context")]
    ParametersMismatch,

    /// Indicates that two ciphertexts do not have the same scale.
    #[error("Scale mismatch: {0} and {1} are not close enough")]
    ScaleMismatch(String, String),

    /// Indicates that a scale exceeds the capacity of the modulus.
    #[error("Scale out of bounds: 2^{0} does not fit a {1}-bit modulus")]
    ScaleOutOfBounds(String, usize),

    /// Indicates that two operands are not at the same level.
    #[error("Level mismatch: {0} and {1}")]
    LevelMismatch(usize, usize),

    /// Indicates that a value cannot be encoded.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Indicates too many values were provided.
    #[error("Too many values provided: {0} exceeds limit {1}")]
    TooManyValues(usize, usize),

    /// Indicates too few values were provided.
    #[error("Too few values provided: {0} is below limit {1}")]
    TooFewValues(usize, usize),

    /// Indicates a parameter error.
    #[error("{0}")]
    ParametersError(ParametersError),

    /// Indicates a default error.
    #[error("{0}")]
    DefaultError(String),
}

impl From<fhe_math::Error> for Error {
    fn from(e: fhe_math::Error) -> Self {
        Error::MathError(e)
    }
}

/// Separate enum to indicate parameters-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParametersError {
    /// Indicates that the degree is invalid.
    #[error("Invalid degree: {0} is not a power of 2 larger than 8")]
    InvalidDegree(usize),

    /// Indicates that the moduli sizes are invalid.
    #[error("Invalid modulus size: {0}, expected an integer between {1} and {2}")]
    InvalidModulusSize(usize, usize, usize),

    /// Indicates that there exists not enough primes.
    #[error("Not enough primes of size {0} for polynomials of degree {1}")]
    NotEnoughPrimes(usize, usize),

    /// Indicates that the scheme identifier is not supported.
    #[error("Unsupported scheme identifier: {0}")]
    UnsupportedScheme(u32),

    /// Indicates that too many parameters were specified.
    #[error("{0}")]
    TooManySpecified(String),

    /// Indicates that too few parameters were specified.
    #[error("{0}")]
    TooFewSpecified(String),
}
