use crate::Headers;
use crate::codec::CodecError;
use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

/// Encodes and decodes the header (`arg2`) and body (`arg3`) payloads for a
/// single argument scheme.
///
/// Implementations must be deterministic: the same input always yields the
/// same bytes, and decoding is a pure function of the payload. An empty
/// header payload decodes to an empty map.
///
/// Absent bodies never reach a codec. The response builder substitutes an
/// empty payload for them, and an empty `arg3` is treated as "no body"
/// without consulting the codec.
pub trait ArgCodec: Send + Sync {
    /// Encodes application headers into an `arg2` payload. An empty map
    /// yields a valid, non-null payload for the scheme.
    fn encode_headers(&self, headers: &Headers) -> Result<Bytes, CodecError>;

    /// Decodes an `arg2` payload into application headers.
    fn decode_headers(&self, arg2: &[u8]) -> Result<Headers, CodecError>;

    /// Encodes a body value into an `arg3` payload.
    fn encode_body<T>(&self, body: &T) -> Result<Bytes, CodecError>
    where
        T: Serialize + ?Sized;

    /// Decodes a non-empty `arg3` payload into `T`.
    fn decode_body<T>(&self, arg3: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned;
}
