use crate::codec::{ArgCodec, ArgScheme, SchemeRegistry};
use crate::message::{DisplayMap, ResponseBuilder, ResponseCode};
use crate::{Headers, MessageError, TransportHeaders};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use std::fmt;

const UNDECODED: &str = "<undecoded>";

/// A successful reply whose headers and body travel as encoded `arg2`/`arg3`
/// payloads.
///
/// The payloads are fixed at construction. Structured headers and body are
/// decoded from them on first access and cached; each cache is written at
/// most once, so concurrent readers always observe either nothing or the
/// complete value.
#[derive(Debug, Clone)]
pub struct EncodedResponse<T> {
    pub(crate) id: u32,
    pub(crate) response_code: ResponseCode,
    pub(crate) transport_headers: TransportHeaders,
    pub(crate) arg_scheme: ArgScheme,
    pub(crate) arg2: Bytes,
    pub(crate) arg3: Bytes,
    pub(crate) headers: OnceCell<Headers>,
    pub(crate) body: OnceCell<Option<T>>,
}

impl<T> EncodedResponse<T> {
    pub fn builder(id: u32, arg_scheme: ArgScheme) -> ResponseBuilder<T> {
        ResponseBuilder::new(id, arg_scheme)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn response_code(&self) -> ResponseCode {
        self.response_code
    }

    pub fn transport_headers(&self) -> &TransportHeaders {
        &self.transport_headers
    }

    pub fn arg_scheme(&self) -> ArgScheme {
        self.arg_scheme
    }

    /// Encoded headers payload. Always present after `build()`.
    pub fn arg2(&self) -> &Bytes {
        &self.arg2
    }

    /// Encoded body payload. Empty when the reply carries no body.
    pub fn arg3(&self) -> &Bytes {
        &self.arg3
    }

    /// Application headers, decoded from `arg2` on first call.
    pub fn headers<C: ArgCodec>(
        &self,
        registry: &SchemeRegistry<C>,
    ) -> Result<&Headers, MessageError> {
        self.headers.get_or_try_init(|| {
            if self.arg2.is_empty() {
                return Ok(Headers::new());
            }

            tracing::trace!(
                "Decoding {} bytes of `{}` headers for response {}",
                self.arg2.len(),
                self.arg_scheme,
                self.id
            );
            registry.decode_headers(&self.arg2, self.arg_scheme)
        })
    }

    pub fn header<C: ArgCodec>(
        &self,
        key: &str,
        registry: &SchemeRegistry<C>,
    ) -> Result<Option<&str>, MessageError> {
        Ok(self.headers(registry)?.get(key).map(String::as_str))
    }

    /// Body, decoded from `arg3` on first call. An empty `arg3` means the
    /// reply has no body.
    pub fn body<C: ArgCodec>(
        &self,
        registry: &SchemeRegistry<C>,
    ) -> Result<Option<&T>, MessageError>
    where
        T: DeserializeOwned,
    {
        let body = self.body.get_or_try_init(|| {
            if self.arg3.is_empty() {
                return Ok::<_, MessageError>(None);
            }

            tracing::trace!(
                "Decoding {} bytes of `{}` body for response {}",
                self.arg3.len(),
                self.arg_scheme,
                self.id
            );
            registry.decode_body(&self.arg3, self.arg_scheme).map(Some)
        })?;

        Ok(body.as_ref())
    }

    /// Hands the wire payloads to a transport.
    pub fn into_args(self) -> (Bytes, Bytes) {
        (self.arg2, self.arg3)
    }
}

impl<T: fmt::Debug> fmt::Display for EncodedResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<EncodedResponse id={} responseCode={:?} transportHeaders={} argScheme={} headers=",
            self.id,
            self.response_code,
            DisplayMap(&self.transport_headers),
            self.arg_scheme
        )?;

        // Only what is already cached; rendering never decodes.
        match self.headers.get() {
            Some(headers) => write!(f, "{}", DisplayMap(headers))?,
            None => f.write_str(UNDECODED)?,
        }

        f.write_str(" body=")?;
        match self.body.get() {
            Some(body) => write!(f, "{body:?}")?,
            None => f.write_str(UNDECODED)?,
        }

        f.write_str(">")
    }
}
