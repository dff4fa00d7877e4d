use crate::TransportHeaders;
use crate::message::{EncodedResponse, ErrorResponse, ResponseCode};
use std::fmt;

/// A reply to a call: either an encoded success or an error.
#[derive(Debug, Clone)]
pub enum Response<T> {
    Success(EncodedResponse<T>),
    Error(ErrorResponse),
}

impl<T> Response<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    pub fn id(&self) -> u32 {
        match self {
            Response::Success(response) => response.id(),
            Response::Error(response) => response.id(),
        }
    }

    pub fn response_code(&self) -> ResponseCode {
        match self {
            Response::Success(response) => response.response_code(),
            Response::Error(_) => ResponseCode::Error,
        }
    }

    pub fn transport_headers(&self) -> &TransportHeaders {
        match self {
            Response::Success(response) => response.transport_headers(),
            Response::Error(response) => response.transport_headers(),
        }
    }

    pub fn success(&self) -> Option<&EncodedResponse<T>> {
        match self {
            Response::Success(response) => Some(response),
            Response::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorResponse> {
        match self {
            Response::Success(_) => None,
            Response::Error(response) => Some(response),
        }
    }

    pub fn into_result(self) -> Result<EncodedResponse<T>, ErrorResponse> {
        match self {
            Response::Success(response) => Ok(response),
            Response::Error(response) => Err(response),
        }
    }
}

impl<T> From<EncodedResponse<T>> for Response<T> {
    fn from(response: EncodedResponse<T>) -> Self {
        Response::Success(response)
    }
}

impl<T> From<ErrorResponse> for Response<T> {
    fn from(response: ErrorResponse) -> Self {
        Response::Error(response)
    }
}

impl<T: fmt::Debug> fmt::Display for Response<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Success(response) => fmt::Display::fmt(response, f),
            Response::Error(response) => fmt::Display::fmt(response, f),
        }
    }
}
