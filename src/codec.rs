mod arg_codec;
mod arg_scheme;
mod builtin_codec;
mod codec_error;
#[cfg(feature = "json")]
mod json_codec;
mod scheme_registry;
mod thrift_binary;
mod thrift_codec;

pub use arg_codec::ArgCodec;
pub use arg_scheme::ArgScheme;
pub use builtin_codec::BuiltinCodec;
pub use codec_error::CodecError;
#[cfg(feature = "json")]
pub use json_codec::JsonCodec;
pub use scheme_registry::SchemeRegistry;
pub use thrift_codec::ThriftCodec;
