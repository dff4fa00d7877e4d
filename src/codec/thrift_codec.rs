use crate::Headers;
use crate::codec::thrift_binary;
use crate::codec::{ArgCodec, ArgScheme, CodecError};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;

/// Size in bytes of every length prefix in the header layout (u16).
const HEADER_LENGTH_SIZE: usize = 2;

/// Thrift codec.
///
/// Headers use the thrift header layout, big-endian:
///
/// ```text
/// nh:2 (klen:2 key~klen vlen:2 value~vlen){nh}
/// ```
///
/// Bodies use the Thrift binary protocol. Structs are written with field ids
/// `1..=n` in declaration order, so only bodies read back into a known type
/// decode; internally tagged and untagged shapes do not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThriftCodec;

fn header_error(reason: impl Into<String>) -> CodecError {
    CodecError::Headers {
        scheme: ArgScheme::Thrift,
        reason: reason.into(),
    }
}

fn put_field(buf: &mut BytesMut, field: &str) -> Result<(), CodecError> {
    let len = u16::try_from(field.len())
        .map_err(|_| header_error(format!("header field of {} bytes is too long", field.len())))?;
    buf.put_u16(len);
    buf.put_slice(field.as_bytes());
    Ok(())
}

fn read_u16(cursor: &mut &[u8]) -> Result<u16, CodecError> {
    if cursor.remaining() < HEADER_LENGTH_SIZE {
        return Err(header_error("truncated length prefix"));
    }
    Ok(cursor.get_u16())
}

fn read_field(cursor: &mut &[u8]) -> Result<String, CodecError> {
    let len = usize::from(read_u16(cursor)?);
    if cursor.remaining() < len {
        return Err(header_error(format!(
            "header field declares {len} bytes, {} remain",
            cursor.remaining()
        )));
    }

    let field = std::str::from_utf8(&cursor[..len])
        .map_err(|err| header_error(err.to_string()))?
        .to_string();
    cursor.advance(len);

    Ok(field)
}

impl ArgCodec for ThriftCodec {
    fn encode_headers(&self, headers: &Headers) -> Result<Bytes, CodecError> {
        let count = u16::try_from(headers.len())
            .map_err(|_| header_error(format!("{} headers exceed the limit", headers.len())))?;

        // Sorted so equal maps always encode to equal bytes.
        let sorted: BTreeMap<&str, &str> = headers
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        let payload_len: usize = sorted
            .iter()
            .map(|(key, value)| 2 * HEADER_LENGTH_SIZE + key.len() + value.len())
            .sum();

        let mut buf = BytesMut::with_capacity(HEADER_LENGTH_SIZE + payload_len);
        buf.put_u16(count);
        for (key, value) in sorted {
            put_field(&mut buf, key)?;
            put_field(&mut buf, value)?;
        }

        Ok(buf.freeze())
    }

    fn decode_headers(&self, arg2: &[u8]) -> Result<Headers, CodecError> {
        if arg2.is_empty() {
            return Ok(Headers::new());
        }

        let mut cursor = arg2;
        let count = read_u16(&mut cursor)?;
        let mut headers = Headers::with_capacity(usize::from(count));

        for _ in 0..count {
            let key = read_field(&mut cursor)?;
            let value = read_field(&mut cursor)?;
            headers.insert(key, value);
        }

        if cursor.has_remaining() {
            return Err(header_error(format!(
                "{} trailing bytes after {count} headers",
                cursor.remaining()
            )));
        }

        Ok(headers)
    }

    fn encode_body<T>(&self, body: &T) -> Result<Bytes, CodecError>
    where
        T: Serialize + ?Sized,
    {
        thrift_binary::to_vec(body)
            .map(Bytes::from)
            .map_err(|err| CodecError::Encode {
                scheme: ArgScheme::Thrift,
                reason: err.to_string(),
            })
    }

    fn decode_body<T>(&self, arg3: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        thrift_binary::from_slice(arg3).map_err(|err| CodecError::Decode {
            scheme: ArgScheme::Thrift,
            reason: err.to_string(),
        })
    }
}
