use super::responder::{ActivityLaunch, Responder, Stage, StageOrigin};
use crate::domain::messages::{InternalData, PaymentResponse};
use crate::domain::ports::CommunicatorBox;
use crate::error::Result;
use crate::interfaces::wire::{AppMessage, AppMessageType};
use tracing::debug;

/// Participant in the post-flow stage, after the payment outcome is known.
///
/// There is nothing to report back, so both completion paths send the same
/// empty response.
pub struct PostFlowModel {
    responder: Responder,
    payment_response: PaymentResponse,
}

impl PostFlowModel {
    pub fn from_service(
        communicator: CommunicatorBox,
        payment_response: PaymentResponse,
        sender: Option<InternalData>,
    ) -> Self {
        Self {
            responder: Responder::new(communicator, StageOrigin::Service, sender),
            payment_response,
        }
    }

    pub fn from_activity(launch: &ActivityLaunch, communicator: CommunicatorBox) -> Result<Self> {
        let payment_response: PaymentResponse = launch.decode_request()?;
        Ok(Self {
            responder: Responder::new(communicator, StageOrigin::Activity, None),
            payment_response,
        })
    }

    pub fn payment_response(&self) -> &PaymentResponse {
        &self.payment_response
    }

    /// Releases the flow while the app keeps working in the background.
    pub fn process_in_background(&mut self) -> Result<()> {
        debug!(payment = %self.payment_response.id, "post-flow continues in background");
        self.send_empty_response()
    }

    pub fn finish(&mut self) -> Result<()> {
        debug!(payment = %self.payment_response.id, "post-flow finished");
        self.send_empty_response()
    }

    fn send_empty_response(&mut self) -> Result<()> {
        self.responder
            .send_response(AppMessage::empty(AppMessageType::Response))
    }
}

impl Stage for PostFlowModel {
    fn responder(&self) -> &Responder {
        &self.responder
    }

    fn responder_mut(&mut self) -> &mut Responder {
        &mut self.responder
    }

    fn request_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.payment_response)?)
    }
}
