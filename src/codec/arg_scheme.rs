use crate::MessageError;
use std::fmt;
use std::str::FromStr;

/// Selects the codec that interprets the `arg2`/`arg3` payloads of a call.
///
/// The wire tag of each scheme is what travels in the `as` transport header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgScheme {
    Raw,
    Json,
    Thrift,
    StreamingThrift,
}

impl ArgScheme {
    pub const ALL: [ArgScheme; 4] = [
        ArgScheme::Raw,
        ArgScheme::Json,
        ArgScheme::Thrift,
        ArgScheme::StreamingThrift,
    ];

    /// Returns the wire tag for this scheme.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            ArgScheme::Raw => "raw",
            ArgScheme::Json => "json",
            ArgScheme::Thrift => "thrift",
            ArgScheme::StreamingThrift => "sthrift",
        }
    }
}

impl fmt::Display for ArgScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgScheme {
    type Err = MessageError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ArgScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == tag)
            .ok_or_else(|| MessageError::UnsupportedScheme {
                scheme: tag.to_string(),
            })
    }
}
