/// Errors produced while encoding a [`Datum`](crate::Datum) into JSON.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum EncodingError {
    /// An integer does not fit in a 64-bit signed or unsigned JSON number.
    #[error("integer {value} is outside the encodable 64-bit range")]
    IntegerOutOfRange { value: String },

    /// A float is NaN or infinite, which JSON cannot represent.
    #[error("float {value} is not finite and cannot be encoded")]
    NonFiniteFloat { value: f64 },

    /// A negative duration has no time-of-day representation.
    #[error("duration {seconds}s is negative and has no time-of-day form")]
    NegativeDuration { seconds: i64 },

    /// An element nested inside a list or map failed to encode.
    #[error("at {path}: {source}")]
    Nested {
        path: String,
        #[source]
        source: Box<EncodingError>,
    },
}

impl EncodingError {
    /// Wrap `self` with one more path segment, innermost segment last.
    #[must_use]
    pub(crate) fn within(self, segment: &str) -> Self {
        match self {
            Self::Nested { path, source } => Self::Nested {
                path: format!("{segment}{path}"),
                source,
            },
            other => Self::Nested {
                path: segment.to_owned(),
                source: Box::new(other),
            },
        }
    }
}
