use crate::TransportHeaders;
use crate::message::DisplayMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Error codes carried by an error reply.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum ErrorType {
    Timeout = 0x01,
    Cancelled = 0x02,
    Busy = 0x03,
    Declined = 0x04,
    UnexpectedError = 0x05,
    BadRequest = 0x06,
    NetworkError = 0x07,
    Unhealthy = 0x08,
    FatalProtocolError = 0xff,
}

impl ErrorType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorType::Timeout => "timeout",
            ErrorType::Cancelled => "cancelled",
            ErrorType::Busy => "busy",
            ErrorType::Declined => "declined",
            ErrorType::UnexpectedError => "unexpected error",
            ErrorType::BadRequest => "bad request",
            ErrorType::NetworkError => "network error",
            ErrorType::Unhealthy => "unhealthy",
            ErrorType::FatalProtocolError => "fatal protocol error",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply that reports a failure. It never carries headers or a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    id: u32,
    error_type: ErrorType,
    message: String,
    transport_headers: TransportHeaders,
}

impl ErrorResponse {
    pub fn new(id: u32, error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            id,
            error_type,
            message: message.into(),
            transport_headers: TransportHeaders::new(),
        }
    }

    pub fn with_transport_headers(mut self, transport_headers: TransportHeaders) -> Self {
        self.transport_headers = transport_headers;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transport_headers(&self) -> &TransportHeaders {
        &self.transport_headers
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<ErrorResponse id={} errorType={} message={} transportHeaders={}>",
            self.id,
            self.error_type,
            self.message,
            DisplayMap(&self.transport_headers)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_codes() {
        assert_eq!(u8::from(ErrorType::Busy), 0x03);
        assert_eq!(
            ErrorType::try_from(0xffu8).unwrap(),
            ErrorType::FatalProtocolError
        );
        assert!(ErrorType::try_from(0x00u8).is_err());
    }

    #[test]
    fn renders_error_fields() {
        let response = ErrorResponse::new(9, ErrorType::BadRequest, "no such endpoint");
        assert_eq!(
            response.to_string(),
            "<ErrorResponse id=9 errorType=bad request message=no such endpoint transportHeaders={}>"
        );
    }
}
