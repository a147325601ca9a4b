use crate::domain::messages::InternalData;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppMessageType {
    Request,
    Response,
    Event,
    Status,
    Failure,
}

/// The envelope for every message on a communicator channel.
///
/// `message_data` holds the JSON of the carried domain object (Request,
/// Response, FlowEvent, ...) as a string, or is empty for payload-less
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMessage {
    pub message_type: AppMessageType,
    #[serde(default)]
    pub message_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_data: Option<InternalData>,
}

impl AppMessage {
    pub fn new(message_type: AppMessageType, message_data: String) -> Self {
        Self {
            message_type,
            message_data,
            internal_data: Some(InternalData::new(API_VERSION)),
        }
    }

    pub fn empty(message_type: AppMessageType) -> Self {
        Self::new(message_type, String::new())
    }

    /// Wraps `payload` as this message's data.
    pub fn wrap<T: Serialize>(message_type: AppMessageType, payload: &T) -> Result<Self> {
        Ok(Self::new(message_type, serde_json::to_string(payload)?))
    }

    /// Decodes the carried domain object.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.message_data)?)
    }

    pub fn has_payload(&self) -> bool {
        !self.message_data.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
