//! Shared types for the scene hub.
//!
//! This module defines:
//! - `ClientId`: a lightweight handle for connected clients
//! - channel aliases between clients and the router loop
//! - `RouterRequest`: messages flowing from clients to the router

use std::fmt;

use scene_core::Message;
use tokio::sync::mpsc;

/// Identifier for a connected client.
///
/// Unique over the lifetime of a [`crate::server::Hub`]. Ids are handed
/// out in connection order, which is also the fan-out order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound messages from the router to a given client.
pub type OutboundTx = mpsc::UnboundedSender<Message>;
pub type OutboundRx = mpsc::UnboundedReceiver<Message>;

/// Request flowing from a client task into the central router task.
#[derive(Debug)]
pub enum RouterRequest {
    /// A new client wants the current scene and then live updates.
    ///
    /// The router queues the replay on `outbound` and registers the
    /// client in the same step, so nothing is missed or duplicated.
    Join {
        client_id: ClientId,
        outbound: OutboundTx,
    },

    /// A decoded message from a client.
    Inbound { client_id: ClientId, msg: Message },

    /// The client's gateway has stopped.
    ///
    /// Always queued after that client's `Join`, so the router never
    /// registers a client it has already seen leave.
    Leave { client_id: ClientId },
}

/// Channel from clients → router task.
pub type RouterTx = mpsc::UnboundedSender<RouterRequest>;
pub type RouterRx = mpsc::UnboundedReceiver<RouterRequest>;
