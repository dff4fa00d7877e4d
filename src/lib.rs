//! Scheme-driven encoding of RPC call and reply arguments.
//!
//! A [`message::Request`] is a plain structured value. A reply is built as an
//! [`message::EncodedResponse`], whose `arg2` (headers) and `arg3` (body)
//! payloads are encoded through a [`codec::SchemeRegistry`] at build time and
//! decoded lazily, once, on first access.

pub mod codec;
pub mod constants;
mod error;
pub mod message;

pub use error::MessageError;

use std::collections::HashMap;

/// Structured application headers carried in `arg2`.
pub type Headers = HashMap<String, String>;

/// Transport-level metadata, passed through unmodified.
pub type TransportHeaders = HashMap<String, String>;
