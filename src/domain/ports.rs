use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Message channel between the host and a flow app for one stage session.
///
/// At most one inbound request is delivered per session and at most one final
/// response is accepted. `send` only queues the message and never blocks.
#[async_trait]
pub trait ClientCommunicator: Send + Sync {
    /// Waits for the inbound message of `session_id`.
    async fn open(&self, session_id: &str) -> Result<String>;
    /// Queues one outbound message.
    fn send(&self, payload: String) -> Result<()>;
    /// Releases the session. Nothing can be sent afterwards.
    fn close(&self) -> Result<()>;
}

/// Host-owned lookup of `conditionalOn` predicates for the current transaction.
pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(&self, condition: &str) -> bool;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn evaluate(&self, condition: &str) -> bool {
        self(condition)
    }
}

pub type CommunicatorBox = Arc<dyn ClientCommunicator>;
pub type ConditionEvaluatorBox = Box<dyn ConditionEvaluator>;
