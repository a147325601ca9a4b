//! Domain objects exchanged between the host and flow apps.
//!
//! These travel as the JSON `messageData` of an
//! [`AppMessage`](crate::interfaces::wire::AppMessage).

use crate::domain::amounts::Amounts;
use crate::domain::basket::Basket;
use crate::domain::card::Card;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Free-form key/value data attached to requests, responses and events.
pub type AdditionalData = BTreeMap<String, serde_json::Value>;

/// Metadata about the application that sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalData {
    pub sender_api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_app_id: Option<String>,
}

impl InternalData {
    pub fn new(sender_api_version: &str) -> Self {
        Self {
            sender_api_version: sender_api_version.to_string(),
            sender_app_id: None,
        }
    }
}

/// A generic request, defined by a request type and bespoke data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub request_type: String,
    #[serde(default)]
    pub request_data: AdditionalData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_app_id: Option<String>,
}

impl Request {
    pub fn new(request_type: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request_type: request_type.to_string(),
            request_data: AdditionalData::new(),
            target_app_id: None,
        }
    }
}

/// Response to a generic or status-update request.
///
/// `processed_in_background` lets a single listener tell status-update
/// responses apart from foreground generic ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_message: Option<String>,
    #[serde(default)]
    pub response_data: AdditionalData,
    #[serde(default)]
    pub processed_in_background: bool,
}

impl Response {
    pub fn new(request: &Request, success: bool, outcome_message: Option<&str>) -> Self {
        Self {
            id: request.id.clone(),
            success,
            outcome_message: outcome_message.map(str::to_string),
            response_data: AdditionalData::new(),
            processed_in_background: false,
        }
    }
}

/// Interim notification sent while a stage is still being processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: AdditionalData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_request_id: Option<String>,
}

impl FlowEvent {
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            data: AdditionalData::new(),
            originating_request_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatus {
    pub status: String,
    #[serde(default)]
    pub data: AdditionalData,
}

/// The request for a payment flow stage such as card reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub id: String,
    pub flow_type: String,
    pub stage: String,
    pub amounts: Amounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basket: Option<Basket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
}

impl TransactionRequest {
    pub fn new(flow_type: &str, stage: &str, amounts: Amounts) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            flow_type: flow_type.to_string(),
            stage: stage.to_string(),
            amounts,
            basket: None,
            card: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionOutcome {
    Approved,
    Declined,
}

/// The outcome a flow app reports for a transaction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub outcome: TransactionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
}

impl TransactionResponse {
    pub fn approved(request_id: &str, card: Option<Card>) -> Self {
        Self {
            id: request_id.to_string(),
            outcome: TransactionOutcome::Approved,
            card,
            outcome_message: None,
            response_code: None,
        }
    }

    pub fn declined(request_id: &str, message: &str, response_code: Option<&str>) -> Self {
        Self {
            id: request_id.to_string(),
            outcome: TransactionOutcome::Declined,
            card: None,
            outcome_message: Some(message.to_string()),
            response_code: response_code.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Approved,
    PartiallyApproved,
    Declined,
}

/// Final result of a payment, handed to post-flow apps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub outcome: PaymentOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amounts_processed: Option<Amounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}
