use crate::Headers;
use crate::codec::{ArgCodec, ArgScheme, CodecError};
use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;

/// JSON codec: headers are a flat JSON object of strings, bodies are any
/// serde value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

/// Payloads that carry no headers: nothing, an empty JSON string or `null`.
fn is_blank_headers(arg2: &[u8]) -> bool {
    matches!(arg2.trim_ascii(), b"" | b"\"\"" | b"null")
}

impl ArgCodec for JsonCodec {
    fn encode_headers(&self, headers: &Headers) -> Result<Bytes, CodecError> {
        // Sorted so equal maps always encode to equal bytes.
        let sorted: BTreeMap<&str, &str> = headers
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        serde_json::to_vec(&sorted)
            .map(Bytes::from)
            .map_err(|err| CodecError::Headers {
                scheme: ArgScheme::Json,
                reason: err.to_string(),
            })
    }

    fn decode_headers(&self, arg2: &[u8]) -> Result<Headers, CodecError> {
        if is_blank_headers(arg2) {
            return Ok(Headers::new());
        }

        serde_json::from_slice(arg2).map_err(|err| CodecError::Headers {
            scheme: ArgScheme::Json,
            reason: err.to_string(),
        })
    }

    fn encode_body<T>(&self, body: &T) -> Result<Bytes, CodecError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_vec(body)
            .map(Bytes::from)
            .map_err(|err| CodecError::Encode {
                scheme: ArgScheme::Json,
                reason: err.to_string(),
            })
    }

    fn decode_body<T>(&self, arg3: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(arg3).map_err(|err| CodecError::Decode {
            scheme: ArgScheme::Json,
            reason: err.to_string(),
        })
    }
}
