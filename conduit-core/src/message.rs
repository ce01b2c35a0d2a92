//! The message model.

use crate::{error::MessageErrorParse, ext::Ext};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// An in-band policy rejection, rendered on the wire as `<code>::<description>`.
///
/// A message carrying an error must not be routed or delivered. The transport
/// surfaces the error to the client instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageError {
    code: u16,
    description: String,
}

impl MessageError {
    /// Create a new error.
    pub fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// `401::Access denied`, the CSRF rejection.
    pub fn access_denied() -> Self {
        Self::new(401, "Access denied")
    }

    /// The numeric code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.code, self.description)
    }
}

impl FromStr for MessageError {
    type Err = MessageErrorParse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, description) = s
            .split_once("::")
            .ok_or_else(|| MessageErrorParse(s.to_string()))?;
        let code = code
            .trim()
            .parse::<u16>()
            .map_err(|_| MessageErrorParse(s.to_string()))?;
        Ok(Self::new(code, description))
    }
}

impl Serialize for MessageError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A message flowing through the bus.
///
/// The channel is fixed at construction. Hooks may only change the `ext` bag
/// and the `error` field.
///
/// # Example
///
/// ```rust
/// use conduit_core::{Message, MessageError};
/// use serde_json::json;
///
/// let mut message = Message::new("/chat/lobby").with_data(json!({ "text": "hi" }));
/// message.ext_mut().insert("csrfToken", json!("abc"));
/// assert!(!message.is_rejected());
///
/// message.set_error(MessageError::access_denied());
/// assert_eq!(message.error().map(ToString::to_string).as_deref(), Some("401::Access denied"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    channel: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ext: Option<Ext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<MessageError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    successful: Option<bool>,
}

impl Message {
    /// Create an empty message on `channel`.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            data: Value::Null,
            ext: None,
            error: None,
            id: None,
            client_id: None,
            successful: None,
        }
    }

    /// Set the payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Set the ext bag.
    pub fn with_ext(mut self, ext: Ext) -> Self {
        self.ext = Some(ext);
        self
    }

    /// Set the message id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the client id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// The channel this message is published on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The payload, `Null` if absent.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The message id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The bus client id.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Whether this reply reports success.
    pub fn successful(&self) -> Option<bool> {
        self.successful
    }

    /// The ext bag, if present.
    pub fn ext(&self) -> Option<&Ext> {
        self.ext.as_ref()
    }

    /// The ext bag, created on demand.
    pub fn ext_mut(&mut self) -> &mut Ext {
        self.ext.get_or_insert_with(Ext::new)
    }

    /// Remove `key` from the ext bag, returning its value.
    ///
    /// Does not create the bag when it is absent.
    pub fn take_ext_value(&mut self, key: &str) -> Option<Value> {
        self.ext.as_mut().and_then(|ext| ext.remove(key))
    }

    /// The policy error, if one was set.
    pub fn error(&self) -> Option<&MessageError> {
        self.error.as_ref()
    }

    /// Mark the message as rejected.
    pub fn set_error(&mut self, error: MessageError) {
        self.error = Some(error);
    }

    /// Explicitly clear a previously set error.
    pub fn clear_error(&mut self) -> Option<MessageError> {
        self.error.take()
    }

    /// Whether an error is set and the message must not be routed.
    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }

    /// Whether this is a `/meta/` protocol message.
    pub fn is_meta(&self) -> bool {
        self.channel.starts_with("/meta/")
    }

    /// Whether this is a `/service/` message.
    pub fn is_service(&self) -> bool {
        self.channel.starts_with("/service/")
    }

    /// Build the reply sent back to the client for a rejected message.
    ///
    /// Keeps the channel, id, client id and error; drops payload and ext.
    pub fn reply(&self) -> Message {
        Message {
            channel: self.channel.clone(),
            data: Value::Null,
            ext: None,
            error: self.error.clone(),
            id: self.id.clone(),
            client_id: self.client_id.clone(),
            successful: Some(self.error.is_none()),
        }
    }
}
