use super::responder::{ActivityLaunch, Responder, Stage, StageOrigin};
use crate::domain::card::Card;
use crate::domain::messages::{InternalData, TransactionRequest, TransactionResponse};
use crate::domain::ports::CommunicatorBox;
use crate::error::Result;
use crate::interfaces::wire::{AppMessage, AppMessageType};
use tracing::debug;

/// Participant in the card reading stage of a payment flow.
///
/// Exactly one of [`approve_with_card`](Self::approve_with_card),
/// [`skip_card_reading`](Self::skip_card_reading) or
/// [`decline_transaction`](Self::decline_transaction) may be called.
pub struct CardReadingModel {
    responder: Responder,
    request: TransactionRequest,
}

impl CardReadingModel {
    pub fn from_service(
        communicator: CommunicatorBox,
        request: TransactionRequest,
        sender: Option<InternalData>,
    ) -> Self {
        Self {
            responder: Responder::new(communicator, StageOrigin::Service, sender),
            request,
        }
    }

    pub fn from_activity(launch: &ActivityLaunch, communicator: CommunicatorBox) -> Result<Self> {
        let request: TransactionRequest = launch.decode_request()?;
        Ok(Self {
            responder: Responder::new(communicator, StageOrigin::Activity, None),
            request,
        })
    }

    pub fn transaction_request(&self) -> &TransactionRequest {
        &self.request
    }

    /// Approves the stage with the card that was read.
    pub fn approve_with_card(&mut self, card: Card) -> Result<()> {
        let response = TransactionResponse::approved(&self.request.id, Some(card));
        self.respond(response)
    }

    /// Lets the flow continue without reading a card.
    pub fn skip_card_reading(&mut self) -> Result<()> {
        let response = TransactionResponse::approved(&self.request.id, None);
        self.respond(response)
    }

    pub fn decline_transaction(&mut self, message: &str, response_code: Option<&str>) -> Result<()> {
        let response = TransactionResponse::declined(&self.request.id, message, response_code);
        self.respond(response)
    }

    fn respond(&mut self, response: TransactionResponse) -> Result<()> {
        debug!(
            transaction = %self.request.id,
            outcome = ?response.outcome,
            "card reading stage outcome"
        );
        let message = AppMessage::wrap(AppMessageType::Response, &response)?;
        self.responder.send_response(message)
    }
}

impl Stage for CardReadingModel {
    fn responder(&self) -> &Responder {
        &self.responder
    }

    fn responder_mut(&mut self) -> &mut Responder {
        &mut self.responder
    }

    fn request_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.request)?)
    }
}
