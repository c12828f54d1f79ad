use super::{Gateway, GatewayError, Subscription, SubscriptionEvent};
use crate::todo::models::{Todo, TodoId};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Process-local stand-in for the managed backend.
///
/// Behaves like a live query: a new subscriber immediately receives the
/// current collection, and every mutation pushes a full snapshot to every
/// subscriber that is still listening. Blank content is rejected the way a
/// schema with a required field would reject it, and dropping the last handle
/// fails any live query that is still open.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    inner: Arc<Mutex<Collection>>,
    latency: Duration,
}

#[derive(Default)]
struct Collection {
    items: Vec<Todo>,
    subscribers: Vec<mpsc::UnboundedSender<SubscriptionEvent>>,
}

impl Collection {
    fn publish(&mut self) {
        let snapshot = self.items.clone();
        self.subscribers
            .retain(|tx| tx.send(SubscriptionEvent::Snapshot(snapshot.clone())).is_ok());
        debug!(
            items = snapshot.len(),
            subscribers = self.subscribers.len(),
            "published snapshot"
        );
    }

    fn fail_all(&mut self, reason: &str) {
        for tx in self.subscribers.drain(..) {
            let _ = tx.send(SubscriptionEvent::Failed(reason.to_string()));
        }
    }
}

impl Drop for Collection {
    fn drop(&mut self) {
        self.fail_all("gateway shut down");
    }
}

fn require_content(content: &str) -> Result<(), GatewayError> {
    if content.trim().is_empty() {
        return Err(GatewayError::Rejected("content is required".to_string()));
    }
    Ok(())
}

impl InMemoryGateway {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every mutation, to mimic a round trip to a remote service.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        let mut collection = self.lock();
        collection.subscribers.retain(|tx| !tx.is_closed());
        collection.subscribers.len()
    }

    /// Breaks every open live query, as a dropped connection would.
    #[cfg(test)]
    pub fn fail_subscriptions(&self, reason: &str) {
        self.lock().fail_all(reason);
    }

    fn lock(&self) -> MutexGuard<'_, Collection> {
        // A poisoned lock only means another caller panicked mid-publish;
        // the collection itself is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn create(&self, content: String) -> Result<Todo, GatewayError> {
        self.round_trip().await;
        require_content(&content)?;
        let todo = Todo::new(TodoId::new(Uuid::new_v4().to_string()), content);
        let mut collection = self.lock();
        collection.items.push(todo.clone());
        collection.publish();
        Ok(todo)
    }

    async fn update(&self, id: TodoId, content: String) -> Result<Todo, GatewayError> {
        self.round_trip().await;
        require_content(&content)?;
        let mut collection = self.lock();
        let todo = collection
            .items
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
        todo.content = content;
        let updated = todo.clone();
        collection.publish();
        Ok(updated)
    }

    async fn delete(&self, id: TodoId) -> Result<(), GatewayError> {
        self.round_trip().await;
        let mut collection = self.lock();
        let before = collection.items.len();
        collection.items.retain(|todo| todo.id != id);
        if collection.items.len() == before {
            return Err(GatewayError::NotFound(id));
        }
        collection.publish();
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, GatewayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut collection = self.lock();
        tx.send(SubscriptionEvent::Snapshot(collection.items.clone()))
            .map_err(|_| GatewayError::Unavailable("subscriber closed".to_string()))?;
        collection.subscribers.push(tx);
        Ok(Subscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(event: Option<SubscriptionEvent>) -> Vec<String> {
        match event {
            Some(SubscriptionEvent::Snapshot(items)) => {
                items.into_iter().map(|todo| todo.content).collect()
            }
            other => panic!("Expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_collection_first() {
        let gateway = InMemoryGateway::new();
        gateway.create("first".to_string()).await.unwrap();

        let mut subscription = gateway.subscribe().await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["first"]);
    }

    #[tokio::test]
    async fn test_every_mutation_pushes_full_snapshot() {
        let gateway = InMemoryGateway::new();
        let mut subscription = gateway.subscribe().await.unwrap();
        assert!(contents(subscription.next().await).is_empty());

        let a = gateway.create("a".to_string()).await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["a"]);

        gateway.create("b".to_string()).await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["a", "b"]);

        gateway.update(a.id.clone(), "a2".to_string()).await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["a2", "b"]);

        gateway.delete(a.id).await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["b"]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let gateway = InMemoryGateway::new();
        let missing = TodoId::new("missing");

        assert_eq!(
            gateway.update(missing.clone(), "x".to_string()).await,
            Err(GatewayError::NotFound(missing.clone()))
        );
        assert_eq!(gateway.delete(missing.clone()).await, Err(GatewayError::NotFound(missing)));
    }

    #[tokio::test]
    async fn test_unsubscribed_receivers_are_pruned() {
        let gateway = InMemoryGateway::new();
        let subscription = gateway.subscribe().await.unwrap();
        let _other = gateway.subscribe().await.unwrap();
        assert_eq!(gateway.subscriber_count(), 2);

        subscription.unsubscribe();
        assert_eq!(gateway.subscriber_count(), 1);

        gateway.create("x".to_string()).await.unwrap();
        assert_eq!(gateway.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_subscriptions_ends_live_queries() {
        let gateway = InMemoryGateway::new();
        let mut subscription = gateway.subscribe().await.unwrap();
        subscription.next().await;

        gateway.fail_subscriptions("connection lost");

        assert_eq!(
            subscription.next().await,
            Some(SubscriptionEvent::Failed("connection lost".to_string()))
        );
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected() {
        let gateway = InMemoryGateway::new();
        let mut subscription = gateway.subscribe().await.unwrap();
        subscription.next().await;

        let rejected = GatewayError::Rejected("content is required".to_string());
        assert_eq!(gateway.create("   ".to_string()).await, Err(rejected.clone()));

        let todo = gateway.create("kept".to_string()).await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["kept"]);
        assert_eq!(gateway.update(todo.id, String::new()).await, Err(rejected));

        // Neither rejection published anything.
        gateway.create("next".to_string()).await.unwrap();
        assert_eq!(contents(subscription.next().await), vec!["kept", "next"]);
    }

    #[tokio::test]
    async fn test_dropping_gateway_fails_open_subscriptions() {
        let gateway = InMemoryGateway::new();
        let mut subscription = gateway.subscribe().await.unwrap();
        let handle = gateway.clone();

        drop(gateway);
        assert!(contents(subscription.next().await).is_empty());

        drop(handle);
        assert_eq!(
            subscription.next().await,
            Some(SubscriptionEvent::Failed("gateway shut down".to_string()))
        );
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_mutations() {
        let gateway = InMemoryGateway::with_latency(Duration::from_millis(200));
        let started = tokio::time::Instant::now();
        gateway.create("slow".to_string()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
