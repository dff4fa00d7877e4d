use crate::codec::ArgScheme;
use crate::constants::ARG_SCHEME_KEY;
use crate::message::DisplayMap;
use crate::{Headers, MessageError, TransportHeaders};
use std::fmt;

/// An outbound call: target service and endpoint, transport metadata,
/// application headers and an optional body.
///
/// A `Request` never encodes anything itself. Headers and body stay
/// structured until a transport serializes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<T> {
    service: String,
    endpoint: String,
    transport_headers: TransportHeaders,
    headers: Headers,
    body: Option<T>,
}

impl<T> Request<T> {
    pub fn builder(
        body: impl Into<Option<T>>,
        service: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> RequestBuilder<T> {
        RequestBuilder::new(body, service, endpoint)
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport_headers(&self) -> &TransportHeaders {
        &self.transport_headers
    }

    pub fn transport_header(&self, key: &str) -> Option<&str> {
        self.transport_headers.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Argument scheme named by the `as` transport header, if any.
    pub fn arg_scheme(&self) -> Result<Option<ArgScheme>, MessageError> {
        self.transport_header(ARG_SCHEME_KEY)
            .map(str::parse)
            .transpose()
    }

    pub fn into_parts(self) -> (TransportHeaders, Headers, Option<T>) {
        (self.transport_headers, self.headers, self.body)
    }
}

impl<T: fmt::Debug> fmt::Display for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Request service={} transportHeaders={} endpoint={} headers={} body={:?}>",
            self.service,
            DisplayMap(&self.transport_headers),
            self.endpoint,
            DisplayMap(&self.headers),
            self.body
        )
    }
}

/// Staged construction of a [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder<T> {
    service: String,
    endpoint: String,
    transport_headers: TransportHeaders,
    headers: Headers,
    body: Option<T>,
}

impl<T> RequestBuilder<T> {
    pub fn new(
        body: impl Into<Option<T>>,
        service: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            endpoint: endpoint.into(),
            transport_headers: TransportHeaders::new(),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn set_transport_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.transport_headers.insert(key.into(), value.into());
        self
    }

    /// Merges `transport_headers` into the existing set. Later keys win.
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

    /// Shorthand for setting the `as` transport header.
    pub fn set_arg_scheme(self, scheme: ArgScheme) -> Self {
        self.set_transport_header(ARG_SCHEME_KEY, scheme.as_str())
    }

    pub fn set_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Merges `headers` into the existing set. Later keys win.
    pub fn set_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Checks that `service` and `endpoint` were given.
    pub fn validate(&self) -> Result<(), MessageError> {
        if self.service.is_empty() {
            tracing::debug!("Rejecting request without a service");
            return Err(MessageError::MissingRequiredField { field: "service" });
        }

        if self.endpoint.is_empty() {
            tracing::debug!("Rejecting request to `{}` without an endpoint", self.service);
            return Err(MessageError::MissingRequiredField { field: "endpoint" });
        }

        Ok(())
    }

    pub fn build(self) -> Result<Request<T>, MessageError> {
        self.validate()?;

        Ok(Request {
            service: self.service,
            endpoint: self.endpoint,
            transport_headers: self.transport_headers,
            headers: self.headers,
            body: self.body,
        })
    }
}
