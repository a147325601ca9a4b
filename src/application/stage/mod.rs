//! Stage participants.
//!
//! Every variant owns a [`Responder`] that enforces the single-response
//! protocol; the variants only differ in the request they carry and in how
//! they build their response.

pub mod card_reading;
pub mod generic;
pub mod post_flow;
pub mod responder;

use crate::domain::messages::FlowEvent;
use crate::domain::ports::CommunicatorBox;
use crate::domain::stages::{GENERIC, PAYMENT_CARD_READING, POST_FLOW, STATUS_UPDATE};
use crate::error::{FlowError, Result};
use crate::interfaces::wire::{AppMessage, AppMessageType};

pub use card_reading::CardReadingModel;
pub use generic::GenericStageModel;
pub use post_flow::PostFlowModel;
pub use responder::{ActivityLaunch, Responder, Stage, StageOrigin, StageState};

/// The stage model handed to a flow app, tagged by stage.
pub enum StageModel {
    Generic(GenericStageModel),
    CardReading(CardReadingModel),
    PostFlow(PostFlowModel),
}

impl StageModel {
    /// Builds the model for `stage` from the request envelope the host sent.
    pub fn from_service(
        stage: &str,
        communicator: CommunicatorBox,
        message: &AppMessage,
    ) -> Result<Self> {
        if message.message_type != AppMessageType::Request {
            return Err(FlowError::ProtocolViolation(format!(
                "Expected a request to start stage {}, got {:?}",
                stage, message.message_type
            )));
        }
        let sender = message.internal_data.clone();
        let model = match stage {
            GENERIC => Self::Generic(GenericStageModel::from_service(
                communicator,
                message.payload()?,
                sender,
            )),
            STATUS_UPDATE => Self::Generic(GenericStageModel::status_update_from_service(
                communicator,
                message.payload()?,
                sender,
            )),
            PAYMENT_CARD_READING => Self::CardReading(CardReadingModel::from_service(
                communicator,
                message.payload()?,
                sender,
            )),
            POST_FLOW => Self::PostFlow(PostFlowModel::from_service(
                communicator,
                message.payload()?,
                sender,
            )),
            other => {
                return Err(FlowError::ConfigurationError(format!(
                    "No stage model for stage {}",
                    other
                )));
            }
        };
        Ok(model)
    }

    fn stage(&self) -> &dyn Stage {
        match self {
            Self::Generic(model) => model,
            Self::CardReading(model) => model,
            Self::PostFlow(model) => model,
        }
    }

    fn stage_mut(&mut self) -> &mut dyn Stage {
        match self {
            Self::Generic(model) => model,
            Self::CardReading(model) => model,
            Self::PostFlow(model) => model,
        }
    }

    pub fn state(&self) -> StageState {
        self.stage().state()
    }

    pub fn origin(&self) -> StageOrigin {
        self.stage().origin()
    }

    pub fn request_json(&self) -> Result<String> {
        self.stage().request_json()
    }

    pub fn send_event(&self, event: &FlowEvent) -> Result<()> {
        self.stage().send_event(event)
    }

    pub fn close(&mut self) -> Result<()> {
        self.stage_mut().close()
    }
}
