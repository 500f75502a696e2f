//! Request body for POST operations.

use crate::html::values::FormValues;
use bytes::Bytes;

/// Content type sent with [`RequestBody::form`] payloads.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Payload of an outgoing request. Cloned on every redirect hop that
/// replays it.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
}

impl RequestBody {
    /// URL-encode form values into a body.
    pub fn form(values: &FormValues) -> Self {
        RequestBody::Bytes(Bytes::from(values.encode()))
    }

    /// Bytes to put on the wire; empty for [`RequestBody::Empty`].
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
        }
    }
}
