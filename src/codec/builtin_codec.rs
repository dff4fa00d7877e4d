use crate::Headers;
#[cfg(feature = "json")]
use crate::codec::JsonCodec;
use crate::codec::{ArgCodec, CodecError, ThriftCodec};
use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

/// The codecs shipped with this crate, dispatched statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCodec {
    #[cfg(feature = "json")]
    Json(JsonCodec),
    Thrift(ThriftCodec),
}

impl ArgCodec for BuiltinCodec {
    fn encode_headers(&self, headers: &Headers) -> Result<Bytes, CodecError> {
        match self {
            #[cfg(feature = "json")]
            BuiltinCodec::Json(codec) => codec.encode_headers(headers),
            BuiltinCodec::Thrift(codec) => codec.encode_headers(headers),
        }
    }

    fn decode_headers(&self, arg2: &[u8]) -> Result<Headers, CodecError> {
        match self {
            #[cfg(feature = "json")]
            BuiltinCodec::Json(codec) => codec.decode_headers(arg2),
            BuiltinCodec::Thrift(codec) => codec.decode_headers(arg2),
        }
    }

    fn encode_body<T>(&self, body: &T) -> Result<Bytes, CodecError>
    where
        T: Serialize + ?Sized,
    {
        match self {
            #[cfg(feature = "json")]
            BuiltinCodec::Json(codec) => codec.encode_body(body),
            BuiltinCodec::Thrift(codec) => codec.encode_body(body),
        }
    }

    fn decode_body<T>(&self, arg3: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        match self {
            #[cfg(feature = "json")]
            BuiltinCodec::Json(codec) => codec.decode_body(arg3),
            BuiltinCodec::Thrift(codec) => codec.decode_body(arg3),
        }
    }
}
