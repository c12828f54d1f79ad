//! Contract of the remote collection service that owns the todo records.
//!
//! The client never stores todos itself: it sends mutations through a
//! [`Gateway`] and learns about their effect from the snapshots pushed over a
//! [`Subscription`].

pub mod memory;
#[cfg(test)]
pub mod recording;

use crate::todo::models::{Todo, TodoId};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// Complete, ordered contents of the collection.
    Snapshot(Vec<Todo>),
    /// The live query broke; no further snapshots follow.
    Failed(String),
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn create(&self, content: String) -> Result<Todo, GatewayError>;
    async fn update(&self, id: TodoId, content: String) -> Result<Todo, GatewayError>;
    async fn delete(&self, id: TodoId) -> Result<(), GatewayError>;
    async fn subscribe(&self) -> Result<Subscription, GatewayError>;
}

/// Receiving half of a live query. Dropping it, or calling
/// [`Subscription::unsubscribe`], releases the registration on the gateway side.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SubscriptionEvent>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<SubscriptionEvent>) -> Self {
        Self { events }
    }

    /// Next pushed event, or `None` once the gateway side has gone away.
    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.events.close();
    }
}
