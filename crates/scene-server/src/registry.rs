//! Registry of connected clients and their outbound channels.
//!
//! Mutated only by the router (join, leave, fan-out failures) and read
//! by the HTTP layer, so every access goes through an async `RwLock`.
//! Iteration follows `ClientId` order.

use std::collections::BTreeMap;
use std::sync::Arc;

use scene_core::Message;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::types::{ClientId, OutboundTx};

#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    clients: Arc<RwLock<BTreeMap<ClientId, OutboundTx>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Register a client. Replaces any channel already stored under the id.
    pub async fn add(&self, client_id: ClientId, outbound: OutboundTx) {
        let mut guard = self.clients.write().await;
        guard.insert(client_id, outbound);
    }

    /// Deregister a client. Returns whether it was registered.
    pub async fn remove(&self, client_id: ClientId) -> bool {
        let mut guard = self.clients.write().await;
        guard.remove(&client_id).is_some()
    }

    pub async fn contains(&self, client_id: ClientId) -> bool {
        self.clients.read().await.contains_key(&client_id)
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// Apply `f` to every registered channel.
    ///
    /// Channels for which `f` fails are removed once iteration is done.
    /// Returns the number of channels `f` succeeded on.
    pub async fn for_each<F, E>(&self, mut f: F) -> usize
    where
        F: FnMut(ClientId, &OutboundTx) -> Result<(), E>,
        E: std::fmt::Display,
    {
        let mut failed = Vec::new();
        let mut delivered = 0;
        {
            let guard = self.clients.read().await;
            for (&client_id, tx) in guard.iter() {
                match f(client_id, tx) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        warn!(%client_id, error = %e, "dropping client after failed send");
                        failed.push(client_id);
                    }
                }
            }
        }

        if !failed.is_empty() {
            let mut guard = self.clients.write().await;
            for client_id in &failed {
                guard.remove(client_id);
            }
        }

        delivered
    }

    /// Queue `msg` for every registered client.
    ///
    /// A client whose queue is closed (its writer has gone away) is
    /// dropped from the registry and does not get later broadcasts.
    pub async fn broadcast(&self, msg: &Message) -> usize {
        let delivered = self
            .for_each(|_, tx| tx.send(msg.clone()).map_err(|_| "outbound queue closed"))
            .await;
        debug!(kind = %msg.kind, handle = %msg.model_handle, delivered, "broadcast message");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::types::OutboundRx;

    fn channel() -> (OutboundTx, OutboundRx) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn add_and_remove() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = channel();

        registry.add(ClientId(1), tx).await;
        assert!(registry.contains(ClientId(1)).await);
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(ClientId(1)).await);
        assert!(!registry.remove(ClientId(1)).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_client() {
        let registry = SessionRegistry::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.add(ClientId(1), tx1).await;
        registry.add(ClientId(2), tx2).await;

        let msg = Message::move_to("0 - cube", vec![1.0, 2.0, 3.0]);
        assert_eq!(registry.broadcast(&msg).await, 2);

        assert_eq!(rx1.try_recv().ok(), Some(msg.clone()));
        assert_eq!(rx2.try_recv().ok(), Some(msg));
    }

    #[tokio::test]
    async fn closed_client_is_dropped_and_skipped_afterwards() {
        let registry = SessionRegistry::new();
        let (tx1, rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.add(ClientId(1), tx1).await;
        registry.add(ClientId(2), tx2).await;
        drop(rx1);

        let first = Message::remove("0 - cube");
        assert_eq!(registry.broadcast(&first).await, 1);
        assert!(!registry.contains(ClientId(1)).await);
        assert_eq!(rx2.try_recv().ok(), Some(first));

        let second = Message::create("cube", "");
        assert_eq!(registry.broadcast(&second).await, 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn for_each_visits_in_client_id_order() {
        let registry = SessionRegistry::new();
        let mut receivers = Vec::new();
        for id in [3, 1, 2] {
            let (tx, rx) = channel();
            registry.add(ClientId(id), tx).await;
            receivers.push(rx);
        }

        let mut seen = Vec::new();
        let visited = registry
            .for_each(|client_id, _| {
                seen.push(client_id.0);
                Ok::<(), &str>(())
            })
            .await;

        assert_eq!(visited, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn for_each_failure_removes_only_that_client() {
        let registry = SessionRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        registry.add(ClientId(1), tx1).await;
        registry.add(ClientId(2), tx2).await;

        let visited = registry
            .for_each(|client_id, _| {
                if client_id == ClientId(2) {
                    Err("boom")
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(visited, 1);
        assert!(registry.contains(ClientId(1)).await);
        assert!(!registry.contains(ClientId(2)).await);
    }

    #[tokio::test]
    async fn broadcast_to_empty_registry() {
        let registry = SessionRegistry::new();
        // Should not panic
        assert_eq!(registry.broadcast(&Message::remove("0 - cube")).await, 0);
    }
}
