//! scene-server
//!
//! Multi-client WebSocket hub keeping a shared 3D scene in sync.

pub mod config;
pub mod types;
pub mod registry;
pub mod server;

// these are internal modules, not re-exported
mod client;
mod router_task;
