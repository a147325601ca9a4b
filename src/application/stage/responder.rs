use crate::domain::messages::{FlowEvent, InternalData};
use crate::domain::ports::CommunicatorBox;
use crate::error::{FlowError, Result};
use crate::interfaces::wire::{AppMessage, AppMessageType};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Protocol state of a stage participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Request received, no response sent yet.
    Created,
    /// The single response has been sent.
    Responded,
    /// Session released.
    Closed,
}

/// How the stage model was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOrigin {
    /// The stage was handed to an interactive screen.
    Activity,
    /// The stage runs headlessly in a service.
    Service,
}

/// Launch parameters of an interactive screen that a stage was delegated to.
#[derive(Debug, Clone, Default)]
pub struct ActivityLaunch {
    params: HashMap<String, String>,
}

impl ActivityLaunch {
    pub const REQUEST_KEY: &'static str = "request";

    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    pub fn with_request(request_json: String) -> Self {
        let mut params = HashMap::new();
        params.insert(Self::REQUEST_KEY.to_string(), request_json);
        Self { params }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the stage request carried in the launch parameters.
    pub fn decode_request<T: DeserializeOwned>(&self) -> Result<T> {
        let json = self.param(Self::REQUEST_KEY).ok_or_else(|| {
            FlowError::ValidationError("Launch parameters carry no stage request".to_string())
        })?;
        serde_json::from_str(json).map_err(|e| {
            FlowError::ValidationError(format!("Malformed stage request in launch parameters: {}", e))
        })
    }
}

/// The respond-exactly-once capability shared by every stage variant.
///
/// Not meant for concurrent use: every transition takes `&mut self`.
pub struct Responder {
    communicator: CommunicatorBox,
    origin: StageOrigin,
    sender: Option<InternalData>,
    state: StageState,
}

impl Responder {
    pub fn new(communicator: CommunicatorBox, origin: StageOrigin, sender: Option<InternalData>) -> Self {
        Self {
            communicator,
            origin,
            sender,
            state: StageState::Created,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn origin(&self) -> StageOrigin {
        self.origin
    }

    /// Metadata of the app that started this stage, when known.
    pub fn sender(&self) -> Option<&InternalData> {
        self.sender.as_ref()
    }

    pub fn assert_not_yet_responded(&self) -> Result<()> {
        match self.state {
            StageState::Created => Ok(()),
            StageState::Responded => Err(FlowError::ProtocolViolation(
                "A response has already been sent for this stage".to_string(),
            )),
            StageState::Closed => Err(FlowError::ProtocolViolation(
                "The stage session has been closed".to_string(),
            )),
        }
    }

    /// Sends the single response of this stage.
    ///
    /// The stage counts as responded from this call on, even if the channel
    /// then fails to queue the message.
    pub fn send_response(&mut self, message: AppMessage) -> Result<()> {
        self.assert_not_yet_responded()?;
        let payload = message.to_json()?;
        self.state = StageState::Responded;
        debug!(origin = ?self.origin, "sending stage response");
        self.communicator.send(payload)
    }

    /// Sends an interim event. Only allowed before the response.
    pub fn send_event(&self, event: &FlowEvent) -> Result<()> {
        self.assert_not_yet_responded()?;
        let message = AppMessage::wrap(AppMessageType::Event, event)?;
        debug!(event_type = %event.event_type, "sending flow event");
        self.communicator.send(message.to_json()?)
    }

    /// Releases the session. Closing an already closed stage does nothing.
    pub fn mark_closed(&mut self) -> Result<()> {
        match self.state {
            StageState::Closed => return Ok(()),
            StageState::Created => warn!("closing stage session without a response"),
            StageState::Responded => {}
        }
        self.state = StageState::Closed;
        self.communicator.close()
    }
}

/// Access to the shared responder, with the operations every variant offers.
pub trait Stage {
    fn responder(&self) -> &Responder;
    fn responder_mut(&mut self) -> &mut Responder;

    /// JSON of the request this stage was created with.
    fn request_json(&self) -> Result<String>;

    fn state(&self) -> StageState {
        self.responder().state()
    }

    fn origin(&self) -> StageOrigin {
        self.responder().origin()
    }

    fn send_event(&self, event: &FlowEvent) -> Result<()> {
        self.responder().send_event(event)
    }

    fn close(&mut self) -> Result<()> {
        self.responder_mut().mark_closed()
    }
}
