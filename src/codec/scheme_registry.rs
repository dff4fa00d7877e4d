use crate::codec::{ArgCodec, ArgScheme, BuiltinCodec, ThriftCodec};
use crate::{Headers, MessageError};
use bytes::Bytes;
use once_cell::sync::Lazy;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;

static GLOBAL_REGISTRY: Lazy<SchemeRegistry> = Lazy::new(SchemeRegistry::default);

/// Maps each argument scheme to the codec that handles it.
///
/// The registry is an ordinary value: builders and lazy accessors take it as
/// an argument, so tests and embedders can substitute their own codecs. It is
/// read-only once shared.
///
/// Asking for a scheme with no registered codec fails with
/// [`MessageError::UnsupportedScheme`].
#[derive(Debug, Clone)]
pub struct SchemeRegistry<C = BuiltinCodec> {
    codecs: HashMap<ArgScheme, C>,
}

impl<C> SchemeRegistry<C>
where
    C: ArgCodec,
{
    /// Creates a registry with no codecs.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    pub fn with_codec(mut self, scheme: ArgScheme, codec: C) -> Self {
        self.register(scheme, codec);
        self
    }

    /// Registers `codec` for `scheme`, returning the codec it replaces.
    pub fn register(&mut self, scheme: ArgScheme, codec: C) -> Option<C> {
        self.codecs.insert(scheme, codec)
    }

    pub fn supports(&self, scheme: ArgScheme) -> bool {
        self.codecs.contains_key(&scheme)
    }

    pub fn schemes(&self) -> impl Iterator<Item = ArgScheme> + '_ {
        self.codecs.keys().copied()
    }

    pub fn codec(&self, scheme: ArgScheme) -> Result<&C, MessageError> {
        self.codecs.get(&scheme).ok_or_else(|| {
            tracing::debug!("No codec registered for arg scheme `{}`", scheme);
            MessageError::UnsupportedScheme {
                scheme: scheme.to_string(),
            }
        })
    }

    pub fn encode_headers(
        &self,
        headers: &Headers,
        scheme: ArgScheme,
    ) -> Result<Bytes, MessageError> {
        Ok(self.codec(scheme)?.encode_headers(headers)?)
    }

    pub fn decode_headers(&self, arg2: &[u8], scheme: ArgScheme) -> Result<Headers, MessageError> {
        Ok(self.codec(scheme)?.decode_headers(arg2)?)
    }

    pub fn encode_body<T>(&self, body: &T, scheme: ArgScheme) -> Result<Bytes, MessageError>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.codec(scheme)?.encode_body(body)?)
    }

    pub fn decode_body<T>(&self, arg3: &[u8], scheme: ArgScheme) -> Result<T, MessageError>
    where
        T: DeserializeOwned,
    {
        Ok(self.codec(scheme)?.decode_body(arg3)?)
    }
}

impl SchemeRegistry<BuiltinCodec> {
    /// Process-wide registry holding the built-in codecs.
    pub fn global() -> &'static SchemeRegistry {
        &GLOBAL_REGISTRY
    }
}

/// Registers JSON (with the `json` feature) and Thrift. Raw and streaming
/// Thrift payloads are left to the transport.
impl Default for SchemeRegistry<BuiltinCodec> {
    fn default() -> Self {
        let registry = SchemeRegistry::new().with_codec(
            ArgScheme::Thrift,
            BuiltinCodec::Thrift(ThriftCodec),
        );

        #[cfg(feature = "json")]
        let registry = registry.with_codec(
            ArgScheme::Json,
            BuiltinCodec::Json(crate::codec::JsonCodec),
        );

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_is_empty() {
        let registry = SchemeRegistry::<BuiltinCodec>::new();

        assert_eq!(registry.schemes().count(), 0);
        assert_eq!(
            registry.codec(ArgScheme::Thrift).unwrap_err(),
            MessageError::UnsupportedScheme {
                scheme: "thrift".to_string()
            }
        );
    }

    #[test]
    fn register_replaces_the_previous_codec() {
        let mut registry = SchemeRegistry::new();

        assert!(registry
            .register(ArgScheme::Thrift, BuiltinCodec::Thrift(ThriftCodec))
            .is_none());
        assert_eq!(
            registry.register(ArgScheme::Thrift, BuiltinCodec::Thrift(ThriftCodec)),
            Some(BuiltinCodec::Thrift(ThriftCodec))
        );
        assert!(registry.supports(ArgScheme::Thrift));
        assert!(!registry.supports(ArgScheme::Raw));
    }
}
