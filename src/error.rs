use crate::codec::CodecError;
use thiserror::Error;

/// Failures raised while constructing messages or resolving their payloads.
///
/// Every variant is fatal to the call that produced it; nothing here is
/// retried or silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// A field required by `build()` was absent.
    #[error("`{field}` is required")]
    MissingRequiredField { field: &'static str },

    /// Both the raw payload and its structured form were supplied.
    #[error("cannot set both `{raw}` and `{structured}`")]
    ConflictingRepresentation {
        raw: &'static str,
        structured: &'static str,
    },

    /// No codec is registered for the requested argument scheme.
    #[error("no codec registered for arg scheme `{scheme}`")]
    UnsupportedScheme { scheme: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
