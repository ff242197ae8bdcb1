use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("input too short, need {needed} bytes but only {remaining} remain")]
    InputTooShort { needed: usize, remaining: usize },
    #[error("input contains {0} trailing bytes after the value")]
    TrailingBytes(usize),
    #[error("non-canonical size information")]
    NonCanonicalSize,
    #[error("non-canonical integer (leading zero bytes)")]
    NonCanonicalInteger,
    #[error("input string too long for {width} byte integer")]
    IntegerOverflow { width: usize },
    #[error("expected string, found list")]
    ExpectedString,
    #[error("expected list, found string")]
    ExpectedList,
    #[error("too few elements, expected {expected} found {found}")]
    TooFewElements { expected: usize, found: usize },
    #[error("too many elements, expected {expected} found {found}")]
    TooManyElements { expected: usize, found: usize },
    #[error("expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("ip must be 0, 4 or 16 bytes, found {0}")]
    InvalidIpLength(usize),
    #[error("declared length does not fit in usize")]
    SizeOverflow,
    #[error("field `{field}`: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn in_field(self, field: &'static str) -> Self {
        DecodeError::Field { field, source: Box::new(self) }
    }

    /// Strips every [`DecodeError::Field`] layer.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            DecodeError::Field { field, .. } => Some(field),
            _ => None,
        }
    }
}
