use crate::application::stage::{StageModel, StageState};
use crate::domain::ports::CommunicatorBox;
use crate::error::Result;
use crate::interfaces::wire::AppMessage;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// What a flow app does with the stage it was handed.
#[async_trait]
pub trait StageHandler: Send + Sync {
    async fn handle(&self, model: &mut StageModel) -> Result<()>;
}

pub type StageHandlerBox = Box<dyn StageHandler>;

/// Service-bound entry point of a flow app.
///
/// Opens the session, builds the stage model from the request envelope and
/// runs the handler on it.
pub struct StageDispatcher {
    handler: StageHandlerBox,
}

impl StageDispatcher {
    pub fn new(handler: StageHandlerBox) -> Self {
        Self { handler }
    }

    /// Serves one stage session and returns the state the stage ended in.
    ///
    /// The session is closed once the handler has responded. A handler that
    /// returns without responding leaves the session open, e.g. for a screen
    /// that takes over. A failing handler abandons the session.
    pub async fn serve(
        &self,
        communicator: CommunicatorBox,
        session_id: &str,
        stage: &str,
    ) -> Result<StageState> {
        let raw = communicator.open(session_id).await?;
        let message = AppMessage::from_json(&raw)?;
        debug!(session_id, stage, "stage request received");

        let mut model = StageModel::from_service(stage, communicator, &message)?;
        if let Err(e) = self.handler.handle(&mut model).await {
            warn!(session_id, stage, error = %e, "stage handler failed");
            model.close()?;
            return Err(e);
        }

        match model.state() {
            StageState::Responded => {
                model.close()?;
                info!(session_id, stage, "stage completed");
            }
            StageState::Created => {
                warn!(session_id, stage, "stage handler returned without responding");
            }
            StageState::Closed => debug!(session_id, stage, "stage closed by handler"),
        }
        Ok(model.state())
    }
}
