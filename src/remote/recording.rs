//! Gateway double that records every call and can be told to reject them.

use super::{Gateway, GatewayError, Subscription, SubscriptionEvent};
use crate::todo::models::{Todo, TodoId};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Update(TodoId, String),
    Delete(TodoId),
    Subscribe,
}

#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    fail_with: Mutex<Option<GatewayError>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SubscriptionEvent>>>,
    next_id: Mutex<u64>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: GatewayError) -> Self {
        let gateway = Self::default();
        *gateway.fail_with.lock().unwrap() = Some(error);
        gateway
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Pushes an event to every subscriber; returns how many received it.
    pub fn push(&self, event: SubscriptionEvent) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn create(&self, content: String) -> Result<Todo, GatewayError> {
        self.record(Call::Create(content.clone()))?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        Ok(Todo::new(TodoId::new(next_id.to_string()), content))
    }

    async fn update(&self, id: TodoId, content: String) -> Result<Todo, GatewayError> {
        self.record(Call::Update(id.clone(), content.clone()))?;
        Ok(Todo::new(id, content))
    }

    async fn delete(&self, id: TodoId) -> Result<(), GatewayError> {
        self.record(Call::Delete(id))
    }

    async fn subscribe(&self) -> Result<Subscription, GatewayError> {
        self.record(Call::Subscribe)?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        Ok(Subscription::new(rx))
    }
}
