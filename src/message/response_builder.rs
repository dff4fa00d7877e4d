use crate::codec::{ArgCodec, ArgScheme, SchemeRegistry};
use crate::message::{EncodedResponse, Request, ResponseCode};
use crate::{Headers, MessageError, TransportHeaders};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use serde::Serialize;

/// Staged construction of an [`EncodedResponse`].
///
/// Headers may be supplied either structured (`set_header`/`set_headers`) or
/// as an encoded `arg2` payload (`set_arg2`), never both. The same holds for
/// the body and `arg3`. A conflicting setter fails immediately and consumes
/// the builder.
///
/// `build()` encodes whatever was supplied structured through the registry,
/// so the resulting response always carries both payloads.
#[derive(Debug, Clone)]
pub struct ResponseBuilder<T> {
    id: u32,
    arg_scheme: ArgScheme,
    response_code: Option<ResponseCode>,
    transport_headers: TransportHeaders,
    headers: Headers,
    body: Option<T>,
    arg2: Option<Bytes>,
    arg3: Option<Bytes>,
}

impl<T> ResponseBuilder<T> {
    pub fn new(id: u32, arg_scheme: ArgScheme) -> Self {
        Self {
            id,
            arg_scheme,
            response_code: None,
            transport_headers: TransportHeaders::new(),
            headers: Headers::new(),
            body: None,
            arg2: None,
            arg3: None,
        }
    }

    /// Starts a reply to `request`, using the argument scheme named in its
    /// `as` transport header and an `Ok` response code.
    pub fn for_request<B>(request: &Request<B>, id: u32) -> Result<Self, MessageError> {
        let arg_scheme = request
            .arg_scheme()?
            .ok_or(MessageError::MissingRequiredField { field: "as" })?;

        Ok(Self::new(id, arg_scheme).set_response_code(ResponseCode::Ok))
    }

    pub fn set_response_code(mut self, response_code: ResponseCode) -> Self {
        self.response_code = Some(response_code);
        self
    }

    pub fn set_transport_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.transport_headers.insert(key.into(), value.into());
        self
    }

    pub fn set_transport_headers<I, K, V>(mut self, transport_headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.transport_headers.extend(
            transport_headers
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Supplies the encoded headers payload.
    pub fn set_arg2(mut self, arg2: impl Into<Bytes>) -> Result<Self, MessageError> {
        if !self.headers.is_empty() {
            return Err(self.conflict("arg2", "headers"));
        }

        self.arg2 = Some(arg2.into());
        Ok(self)
    }

    pub fn set_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, MessageError> {
        if self.arg2.is_some() {
            return Err(self.conflict("arg2", "headers"));
        }

        self.headers.insert(key.into(), value.into());
        Ok(self)
    }

    /// Replaces the structured headers wholesale.
    pub fn set_headers<I, K, V>(mut self, headers: I) -> Result<Self, MessageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if self.arg2.is_some() {
            return Err(self.conflict("arg2", "headers"));
        }

        self.headers = headers
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Ok(self)
    }

    /// Supplies the encoded body payload.
    pub fn set_arg3(mut self, arg3: impl Into<Bytes>) -> Result<Self, MessageError> {
        if self.body.is_some() {
            return Err(self.conflict("arg3", "body"));
        }

        self.arg3 = Some(arg3.into());
        Ok(self)
    }

    pub fn set_body(mut self, body: T) -> Result<Self, MessageError> {
        if self.arg3.is_some() {
            return Err(self.conflict("arg3", "body"));
        }

        self.body = Some(body);
        Ok(self)
    }

    fn conflict(&self, raw: &'static str, structured: &'static str) -> MessageError {
        tracing::debug!(
            "Response {} given both `{}` and `{}`",
            self.id,
            raw,
            structured
        );
        MessageError::ConflictingRepresentation { raw, structured }
    }

    /// Encodes the structured headers and body, checks required fields and
    /// returns the finished response.
    pub fn build<C: ArgCodec>(
        self,
        registry: &SchemeRegistry<C>,
    ) -> Result<EncodedResponse<T>, MessageError>
    where
        T: Serialize,
    {
        let (arg2, headers) = match self.arg2 {
            Some(arg2) => (arg2, OnceCell::new()),
            None => {
                let arg2 = registry.encode_headers(&self.headers, self.arg_scheme)?;
                tracing::trace!(
                    "Encoded {} headers into {} bytes of `{}` for response {}",
                    self.headers.len(),
                    arg2.len(),
                    self.arg_scheme,
                    self.id
                );
                (arg2, OnceCell::with_value(self.headers))
            }
        };

        let (arg3, body) = match (self.arg3, self.body) {
            (Some(arg3), _) => (arg3, OnceCell::new()),
            (None, Some(body)) => {
                let arg3 = registry.encode_body(&body, self.arg_scheme)?;
                tracing::trace!(
                    "Encoded body into {} bytes of `{}` for response {}",
                    arg3.len(),
                    self.arg_scheme,
                    self.id
                );
                (arg3, OnceCell::with_value(Some(body)))
            }
            (None, None) => (Bytes::new(), OnceCell::with_value(None)),
        };

        let response_code = self.response_code.ok_or_else(|| {
            tracing::debug!("Response {} built without a response code", self.id);
            MessageError::MissingRequiredField {
                field: "response_code",
            }
        })?;

        Ok(EncodedResponse {
            id: self.id,
            response_code,
            transport_headers: self.transport_headers,
            arg_scheme: self.arg_scheme,
            arg2,
            arg3,
            headers,
            body,
        })
    }
}
