// src/notify/mod.rs

//! Notification bridge: backends and the composing broadcaster.

pub mod telegram;

use async_trait::async_trait;

use crate::error::Result;

pub use telegram::TelegramNotifier;

/// A notification backend able to reach the owner and the subscriber
/// list of its channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message to the owner.
    async fn send_to_owner(&self, message: &str) -> Result<()>;

    /// Deliver a message to every subscriber.
    async fn send_to_all(&self, message: &str) -> Result<()>;
}

/// Fans messages out over zero or more registered backends.
///
/// Delivery failures are logged per backend and never propagate; a dead
/// notification channel must not take the watcher down with it.
#[derive(Default)]
pub struct Broadcaster {
    services: Vec<Box<dyn Notifier>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend.
    pub fn register(&mut self, service: Box<dyn Notifier>) {
        self.services.push(service);
    }

    /// Whether any backend is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Try to reach the owner over all registered backends.
    pub async fn to_owner(&self, message: &str) {
        for service in &self.services {
            if let Err(e) = service.send_to_owner(message).await {
                log::error!("Owner notification failed: {e}");
            }
        }
    }

    /// Send a message to all subscribers of all registered backends.
    pub async fn over_all(&self, message: &str) {
        for service in &self.services {
            if let Err(e) = service.send_to_all(message).await {
                log::error!("Subscriber notification failed: {e}");
            }
        }
    }
}
