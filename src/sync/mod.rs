//! Keeps the local mirror of the todo collection fed from the gateway's
//! live query.

pub mod commands;

use crate::remote::{Gateway, GatewayError, Subscription, SubscriptionEvent};
use crate::todo::models::Todo;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Connecting,
    Live,
    /// The live query broke; the list shows the last snapshot received.
    Stale(String),
    Closed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Connecting => write!(f, "connecting"),
            SyncStatus::Live => write!(f, "live"),
            SyncStatus::Stale(reason) => write!(f, "stale: {}", reason),
            SyncStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncUpdate {
    Snapshot(Vec<Todo>),
    Lost(String),
}

/// Owns the single subscription of a mounted view.
#[derive(Debug, Default)]
pub struct SyncLoop {
    subscription: Option<Subscription>,
}

impl SyncLoop {
    pub async fn mount(gateway: &dyn Gateway) -> Result<Self, GatewayError> {
        let subscription = gateway.subscribe().await?;
        info!("subscribed to todo snapshots");
        Ok(Self {
            subscription: Some(subscription),
        })
    }

    /// A loop with no subscription; it never yields an update.
    pub fn detached() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Waits for the next pushed update. After the subscription fails, closes,
    /// or is unmounted, this never resolves again.
    pub async fn next_update(&mut self) -> SyncUpdate {
        let Some(subscription) = self.subscription.as_mut() else {
            return std::future::pending().await;
        };

        let event = subscription.next().await;
        match event {
            Some(SubscriptionEvent::Snapshot(items)) => SyncUpdate::Snapshot(items),
            Some(SubscriptionEvent::Failed(reason)) => {
                warn!(%reason, "todo subscription failed");
                self.subscription = None;
                SyncUpdate::Lost(reason)
            }
            None => {
                warn!("todo subscription closed by gateway");
                self.subscription = None;
                SyncUpdate::Lost("subscription closed".to_string())
            }
        }
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("unsubscribed from todo snapshots");
        }
    }
}
