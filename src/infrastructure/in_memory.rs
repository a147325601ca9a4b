use crate::domain::messages::FlowEvent;
use crate::domain::ports::ClientCommunicator;
use crate::error::{FlowError, Result};
use crate::interfaces::wire::{AppMessage, AppMessageType};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

/// Participant side of an in-process stage session.
///
/// Backed by unbounded tokio channels, so `send` never blocks. One pair is
/// created per session with [`InMemoryCommunicator::pair`].
pub struct InMemoryCommunicator {
    session_id: String,
    inbound: Mutex<mpsc::UnboundedReceiver<String>>,
    outbound: mpsc::UnboundedSender<String>,
    delivered: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryCommunicator {
    /// Creates the participant communicator and the matching host endpoint.
    pub fn pair(session_id: &str) -> (Self, HostEndpoint) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let communicator = Self {
            session_id: session_id.to_string(),
            inbound: Mutex::new(inbound_rx),
            outbound: outbound_tx,
            delivered: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        };
        let host = HostEndpoint {
            session_id: session_id.to_string(),
            inbound: inbound_tx,
            outbound: outbound_rx,
            events: Vec::new(),
        };
        (communicator, host)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientCommunicator for InMemoryCommunicator {
    async fn open(&self, session_id: &str) -> Result<String> {
        if session_id != self.session_id {
            return Err(FlowError::ChannelError(format!(
                "Unknown session '{}'",
                session_id
            )));
        }
        if self.is_closed() {
            return Err(FlowError::ChannelError("Session is closed".to_string()));
        }
        if self.delivered.swap(true, Ordering::SeqCst) {
            return Err(FlowError::ChannelError(format!(
                "Request for session '{}' was already delivered",
                session_id
            )));
        }
        let mut inbound = self.inbound.lock().await;
        inbound
            .recv()
            .await
            .ok_or_else(|| FlowError::ChannelError("Host hung up before sending a request".to_string()))
    }

    fn send(&self, payload: String) -> Result<()> {
        if self.is_closed() {
            return Err(FlowError::ChannelError("Session is closed".to_string()));
        }
        self.outbound
            .send(payload)
            .map_err(|_| FlowError::ChannelError("Host is no longer listening".to_string()))
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Host side of an in-process stage session.
pub struct HostEndpoint {
    session_id: String,
    inbound: mpsc::UnboundedSender<String>,
    outbound: mpsc::UnboundedReceiver<String>,
    events: Vec<FlowEvent>,
}

impl HostEndpoint {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Delivers the stage request to the participant.
    pub fn deliver(&self, message: &AppMessage) -> Result<()> {
        self.inbound
            .send(message.to_json()?)
            .map_err(|_| FlowError::ChannelError("Participant is gone".to_string()))
    }

    /// Next message from the participant, waiting at most `timeout`.
    pub async fn next_message(&mut self, timeout: Duration) -> Result<AppMessage> {
        match tokio::time::timeout(timeout, self.outbound.recv()).await {
            Ok(Some(json)) => AppMessage::from_json(&json),
            Ok(None) => Err(FlowError::ChannelError("Participant hung up".to_string())),
            Err(_) => Err(FlowError::Timeout(timeout)),
        }
    }

    /// Waits for the stage response, collecting interim events on the way.
    ///
    /// The whole wait is bounded by `timeout`.
    pub async fn await_response(&mut self, timeout: Duration) -> Result<AppMessage> {
        let deadline = Instant::now() + timeout;
        loop {
            let json = match tokio::time::timeout_at(deadline, self.outbound.recv()).await {
                Ok(Some(json)) => json,
                Ok(None) => return Err(FlowError::ChannelError("Participant hung up".to_string())),
                Err(_) => return Err(FlowError::Timeout(timeout)),
            };
            let message = AppMessage::from_json(&json)?;
            if message.message_type == AppMessageType::Event {
                self.events.push(message.payload()?);
                continue;
            }
            return Ok(message);
        }
    }

    /// A message that was already queued, without waiting.
    pub fn try_next_message(&mut self) -> Result<Option<AppMessage>> {
        match self.outbound.try_recv() {
            Ok(json) => AppMessage::from_json(&json).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Events received so far through [`HostEndpoint::await_response`].
    pub fn events(&self) -> &[FlowEvent] {
        &self.events
    }
}
