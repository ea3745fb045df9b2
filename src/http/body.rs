//! Immutable body buffer.
//!
//! # Design Decisions
//! - Backed by `Bytes`, so clones are reference-counted, never copied
//! - Decoding never panics: invalid UTF-8 is an `Encoding` error
//! - "No body" is modelled by the caller as `Option<Buffer>`, never by an empty buffer

use bytes::Bytes;

use crate::error::TriggerResult;

/// An immutable byte sequence carried as a request or response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer(Bytes);

impl Buffer {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn from_string(text: impl Into<String>) -> Self {
        Self(Bytes::from(text.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the buffer as UTF-8 text.
    pub fn as_str(&self) -> TriggerResult<&str> {
        Ok(std::str::from_utf8(&self.0)?)
    }

    /// Decode the buffer into an owned UTF-8 string.
    pub fn to_utf8_string(&self) -> TriggerResult<String> {
        self.as_str().map(str::to_owned)
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Buffer {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static str> for Buffer {
    fn from(text: &'static str) -> Self {
        Self(Bytes::from_static(text.as_bytes()))
    }
}

impl From<String> for Buffer {
    fn from(text: String) -> Self {
        Self::from_string(text)
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
