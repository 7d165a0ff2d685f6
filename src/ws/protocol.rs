//! Chat wire protocol: inbound frames are open JSON objects.
//!
//! The payload carries at least a `message` field by convention, but only
//! its shape is enforced: any JSON object is relayed, with every
//! non-reserved field passed through unmodified. The server owns exactly
//! one field, `nickname`, which is set to the sender's identity and
//! overwrites any client-supplied value.

use serde_json::{Map, Value};

/// Reserved field injected by the server on every outbound frame.
pub const NICKNAME_FIELD: &str = "nickname";

/// A frame that cannot be relayed. Terminates only the offending session.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("binary frames are not part of the chat protocol")]
    BinaryFrame,
}

/// Parse an inbound text frame and stamp it with the sender's identity.
/// Returns the serialized outbound frame broadcast to every connection.
pub fn tag_frame(raw: &str, identity: &str) -> Result<String, ProtocolError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(mut fields) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    fields.insert(
        NICKNAME_FIELD.to_string(),
        Value::String(identity.to_string()),
    );

    Ok(Value::Object(fields).to_string())
}

/// Parse an outbound frame back into its field map. Test-facing helper for
/// asserting passthrough semantics.
pub fn parse_frame(raw: &str) -> Result<Map<String, Value>, ProtocolError> {
    match serde_json::from_str(raw)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(ProtocolError::NotAnObject),
    }
}
