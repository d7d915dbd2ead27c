//! Central router loop.
//!
//! This task owns the [`Scene`] and processes every [`RouterRequest`]
//! coming from clients, one at a time. Being the only owner is what
//! serializes scene mutation; no lock guards the scene itself.
//!
//! Per request:
//! - `Join`: queue the full replay for the new client, then register it.
//! - `Inbound`: apply to the scene and broadcast the (possibly
//!   rewritten) message to every registered client, before taking the
//!   next request.
//! - `Leave`: deregister the client.

use scene_core::{Effect, Message, Scene};
use tracing::{debug, info, warn};

use crate::registry::SessionRegistry;
use crate::types::{ClientId, OutboundTx, RouterRequest, RouterRx};

/// Run the central router processing loop.
///
/// - `router_rx`: receives requests from all client tasks.
/// - `registry`: connected clients and their outbound channels.
pub async fn run_router_loop(mut router_rx: RouterRx, registry: SessionRegistry) {
    let mut scene = Scene::new();

    while let Some(req) = router_rx.recv().await {
        match req {
            RouterRequest::Join {
                client_id,
                outbound,
            } => join_client(&scene, client_id, outbound, &registry).await,
            RouterRequest::Inbound { client_id, msg } => {
                route_inbound(&mut scene, client_id, msg, &registry).await
            }
            RouterRequest::Leave { client_id } => {
                if registry.remove(client_id).await {
                    let remaining = registry.len().await;
                    debug!(%client_id, remaining, "client left");
                }
            }
        }
    }

    info!("Router loop shutting down (router_rx closed)");
}

async fn join_client(
    scene: &Scene,
    client_id: ClientId,
    outbound: OutboundTx,
    registry: &SessionRegistry,
) {
    let replay = scene.replay();
    let replayed = replay.len();

    for msg in replay {
        if outbound.send(msg).is_err() {
            warn!(%client_id, "client went away during replay; not registering");
            return;
        }
    }

    // The writer may already be gone; with nothing to replay the loop
    // above would not notice.
    if outbound.is_closed() {
        debug!(%client_id, "client went away before joining; not registering");
        return;
    }

    registry.add(client_id, outbound).await;
    info!(
        %client_id,
        replayed,
        models = scene.model_count(),
        "client joined"
    );
}

async fn route_inbound(
    scene: &mut Scene,
    client_id: ClientId,
    msg: Message,
    registry: &SessionRegistry,
) {
    debug!(%client_id, kind = %msg.kind, handle = %msg.model_handle, "message received");

    let applied = match scene.apply(msg) {
        Ok(applied) => applied,
        Err(e) => {
            warn!(%client_id, error = %e, "ignoring message");
            return;
        }
    };

    match &applied.effect {
        Effect::Created { handle } => info!(
            %client_id,
            %handle,
            issued = scene.allocator().issued(),
            "model created"
        ),
        Effect::Removed {
            handle,
            reclaimed: Some(index),
        } => info!(%client_id, %handle, index, "model removed; index queued for reuse"),
        Effect::Removed {
            handle,
            reclaimed: None,
        } => info!(%client_id, %handle, "model removed; scene empty, handle numbering reset"),
        Effect::Updated { handle, kind } => debug!(%client_id, %handle, %kind, "model updated"),
        Effect::PassedThrough => {
            debug!(%client_id, kind = %applied.message.kind, "relaying message without state change")
        }
    }

    registry.broadcast(&applied.message).await;
}
