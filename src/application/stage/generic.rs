use super::responder::{ActivityLaunch, Responder, Stage, StageOrigin};
use crate::domain::messages::{InternalData, Request, Response};
use crate::domain::ports::CommunicatorBox;
use crate::error::Result;
use crate::interfaces::wire::{AppMessage, AppMessageType};
use tracing::debug;

/// Handles a generic request, or a status update when running in the background.
///
/// Status-update responses are flagged as processed in the background so a
/// single listener can tell them apart from foreground generic responses.
pub struct GenericStageModel {
    responder: Responder,
    request: Request,
    background: bool,
}

impl GenericStageModel {
    pub fn from_service(
        communicator: CommunicatorBox,
        request: Request,
        sender: Option<InternalData>,
    ) -> Self {
        Self {
            responder: Responder::new(communicator, StageOrigin::Service, sender),
            request,
            background: false,
        }
    }

    pub fn status_update_from_service(
        communicator: CommunicatorBox,
        request: Request,
        sender: Option<InternalData>,
    ) -> Self {
        Self {
            responder: Responder::new(communicator, StageOrigin::Service, sender),
            request,
            background: true,
        }
    }

    pub fn from_activity(launch: &ActivityLaunch, communicator: CommunicatorBox) -> Result<Self> {
        let request: Request = launch.decode_request()?;
        Ok(Self {
            responder: Responder::new(communicator, StageOrigin::Activity, None),
            request,
            background: false,
        })
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn is_status_update(&self) -> bool {
        self.background
    }

    pub fn send_response(&mut self, mut response: Response) -> Result<()> {
        response.processed_in_background = self.background;
        debug!(
            request_type = %self.request.request_type,
            success = response.success,
            "responding to generic request"
        );
        let message = AppMessage::wrap(AppMessageType::Response, &response)?;
        self.responder.send_response(message)
    }
}

impl Stage for GenericStageModel {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::stage::responder::StageState;
    use crate::error::FlowError;
    use crate::infrastructure::in_memory::InMemoryCommunicator;
    use std::sync::Arc;

    #[test]
    fn test_background_flag_forced_by_variant() {
        let (communicator, mut host) = InMemoryCommunicator::pair("s-1");
        let request = Request::new("refreshLoyalty");
        let mut model =
            GenericStageModel::status_update_from_service(Arc::new(communicator), request.clone(), None);

        model.send_response(Response::new(&request, true, None)).unwrap();

        let message = host.try_next_message().unwrap().unwrap();
        let response: Response = message.payload().unwrap();
        assert!(response.processed_in_background);
        assert_eq!(response.id, request.id);
    }

    #[test]
    fn test_foreground_flag_cleared() {
        let (communicator, mut host) = InMemoryCommunicator::pair("s-1");
        let request = Request::new("showLoyaltyPoints");
        let mut model = GenericStageModel::from_service(Arc::new(communicator), request.clone(), None);

        let mut response = Response::new(&request, true, None);
        response.processed_in_background = true;
        model.send_response(response).unwrap();

        let response: Response = host.try_next_message().unwrap().unwrap().payload().unwrap();
        assert!(!response.processed_in_background);
        assert_eq!(model.state(), StageState::Responded);
    }

    #[test]
    fn test_from_activity() {
        let request = Request::new("showLoyaltyPoints");
        let launch = ActivityLaunch::with_request(serde_json::to_string(&request).unwrap());
        let (communicator, _host) = InMemoryCommunicator::pair("s-1");

        let model = GenericStageModel::from_activity(&launch, Arc::new(communicator)).unwrap();
        assert_eq!(model.request(), &request);
        assert_eq!(model.origin(), StageOrigin::Activity);
        assert!(!model.is_status_update());
    }

    #[test]
    fn test_from_activity_without_request() {
        let (communicator, _host) = InMemoryCommunicator::pair("s-1");
        let result = GenericStageModel::from_activity(&ActivityLaunch::default(), Arc::new(communicator));
        assert!(matches!(result, Err(FlowError::ValidationError(_))));
    }
}
