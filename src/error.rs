//! Errors of this crate. All fatal conditions surface through [`Error`];
//! no diagnostic is ever emitted to an ambient log.

/// A codec that requires a cargo feature to be active.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Feature {
    /// Snappy block compression
    Snappy,
    /// Gzip block compression
    Gzip,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Feature::Snappy => write!(fmt, "snappy"),
            Feature::Gzip => write!(fmt, "gzip"),
        }
    }
}

/// Errors generated by this crate.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// The underlying bytes are known to be out of spec: bad varints, level
    /// values out of range, runs past the declared body, truncated regions,
    /// invalid UTF-8 in a string leaf, unknown enumeration codes.
    OutOfSpec(String),
    /// The caller broke an API contract: mismatched batch lengths, levels
    /// above their maxima, value streams not fully consumed, row-count
    /// mismatches across sibling leaves.
    InvalidParameter(String),
    /// A resource bound was exceeded: a list offset past `i32::MAX` or more
    /// entries than the declared upper bound.
    Overflow(String),
    /// A compression codec was requested whose cargo feature is not active.
    FeatureNotActive(Feature, String),
    /// The bytes ask for a capability this crate does not implement, such as
    /// DataPage V2 or an unsupported value encoding.
    FeatureNotSupported(String),
    /// An error from the injected byte-level I/O, propagated unchanged.
    Io(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::OutOfSpec(message) => write!(fmt, "out of spec: {}", message),
            Error::InvalidParameter(message) => write!(fmt, "invalid parameter: {}", message),
            Error::Overflow(message) => write!(fmt, "overflow: {}", message),
            Error::FeatureNotActive(feature, reason) => {
                write!(
                    fmt,
                    "the feature \"{}\" needs to be active to {}",
                    feature, reason
                )
            }
            Error::FeatureNotSupported(message) => write!(fmt, "not supported: {}", message),
            Error::Io(message) => write!(fmt, "underlying IO error: {}", message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e.to_string())
    }
}

#[cfg(feature = "snappy")]
impl From<snap::Error> for Error {
    fn from(e: snap::Error) -> Error {
        Error::OutOfSpec(format!("underlying snap error: {}", e))
    }
}

/// A specialized `Result` for errors of this crate.
pub type Result<T> = std::result::Result<T, Error>;
