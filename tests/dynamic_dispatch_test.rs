use appflow::application::dispatcher::{StageDispatcher, StageHandler};
use appflow::application::listener::{ResponseListener, dispatch_response_message};
use appflow::application::stage::{StageModel, StageState};
use appflow::domain::messages::{Request, Response};
use appflow::domain::ports::CommunicatorBox;
use appflow::domain::stages::{GENERIC, STATUS_UPDATE};
use appflow::error::Result;
use appflow::infrastructure::in_memory::InMemoryCommunicator;
use appflow::interfaces::wire::{AppMessage, AppMessageType};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Acknowledge;

#[async_trait]
impl StageHandler for Acknowledge {
    async fn handle(&self, model: &mut StageModel) -> Result<()> {
        if let StageModel::Generic(generic) = model {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let response = Response::new(generic.request(), true, None);
            generic.send_response(response)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Collector {
    generic: Mutex<Vec<String>>,
    background: Mutex<Vec<String>>,
}

impl ResponseListener for Collector {
    fn notify_generic_response(&self, response: Response) {
        self.generic.lock().unwrap().push(response.id);
    }

    fn notify_status_update_response(&self, response: Response) {
        self.background.lock().unwrap().push(response.id);
    }
}

#[tokio::test]
async fn test_sessions_served_from_spawned_tasks() {
    let dispatcher = Arc::new(StageDispatcher::new(Box::new(Acknowledge)));
    let listener = Collector::default();

    let mut hosts = Vec::new();
    let mut handles = Vec::new();
    let mut expected_generic = Vec::new();
    let mut expected_background = Vec::new();

    for i in 0..8 {
        let session_id = format!("session-{}", i);
        let (communicator, host) = InMemoryCommunicator::pair(&session_id);
        let communicator: CommunicatorBox = Arc::new(communicator);

        let request = Request::new("sync");
        let stage = if i % 2 == 0 {
            expected_generic.push(request.id.clone());
            GENERIC
        } else {
            expected_background.push(request.id.clone());
            STATUS_UPDATE
        };
        host.deliver(&AppMessage::wrap(AppMessageType::Request, &request).unwrap())
            .unwrap();

        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            dispatcher.serve(communicator, &session_id, stage).await
        }));
        hosts.push(host);
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), StageState::Closed);
    }

    for host in &mut hosts {
        let message = host.await_response(Duration::from_secs(1)).await.unwrap();
        dispatch_response_message(&listener, &message.to_json().unwrap()).unwrap();
    }

    assert_eq!(*listener.generic.lock().unwrap(), expected_generic);
    assert_eq!(*listener.background.lock().unwrap(), expected_background);
}
