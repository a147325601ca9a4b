use crate::domain::messages::Response;
use crate::error::{FlowError, Result};
use crate::interfaces::wire::{AppMessage, AppMessageType};
use tracing::{debug, warn};

/// Receives the responses to generic and status-update requests.
///
/// Both kinds arrive on the same channel and are told apart by
/// `processed_in_background`.
pub trait ResponseListener: Send + Sync {
    fn notify_generic_response(&self, response: Response);

    fn notify_status_update_response(&self, response: Response);

    /// Called when the other side reports a failure instead of a response.
    fn notify_failure(&self, reason: &str) {
        warn!(reason, "request failed");
    }
}

/// Decodes a raw envelope and routes it to the matching listener callback.
pub fn dispatch_response_message(listener: &dyn ResponseListener, raw: &str) -> Result<()> {
    let message = AppMessage::from_json(raw)?;
    match message.message_type {
        AppMessageType::Response => {
            let response: Response = message.payload()?;
            debug!(
                id = %response.id,
                background = response.processed_in_background,
                "routing response"
            );
            if response.processed_in_background {
                listener.notify_status_update_response(response);
            } else {
                listener.notify_generic_response(response);
            }
            Ok(())
        }
        AppMessageType::Failure => {
            listener.notify_failure(&message.message_data);
            Ok(())
        }
        other => Err(FlowError::ProtocolViolation(format!(
            "Listener cannot handle {:?} messages",
            other
        ))),
    }
}
