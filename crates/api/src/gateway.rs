//! Socket.IO stream gateway
//!
//! Clients connect to the default namespace, emit `image` with a data-URI
//! string per frame and receive `response` with the session status. Each
//! connection gets a bounded frame queue filled by the `image` handler and a
//! worker task that drains it in arrival order. When the client falls behind,
//! the oldest pending frame is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::counter;
use ring_buffer::FrameQueue;
use socketioxide::extract::{Data, SocketRef};
use socketioxide::layer::SocketIoLayer;
use socketioxide::socket::DisconnectReason;
use socketioxide::SocketIo;
use tracing::{debug, info, warn};

use crate::metrics::{
    CONNECTIONS_TOTAL, DISCONNECTIONS_TOTAL, FRAMES_DROPPED_TOTAL, FRAMES_RECEIVED_TOTAL,
};
use crate::registry::{ConnectionId, FrameEvent, FrameOutcome};
use crate::AppState;

/// Namespace clients connect to
pub const NAMESPACE: &str = "/";

/// Client → server: one frame as a `<header>,<base64 body>` string
pub const IMAGE_EVENT: &str = "image";

/// Server → client: `{status, color, ear}` after each processed frame
pub const RESPONSE_EVENT: &str = "response";

/// Build the Socket.IO layer serving `/socket.io/`
pub fn socket_layer(state: Arc<AppState>) -> SocketIoLayer {
    let (layer, io) = SocketIo::builder()
        .max_payload(state.server.max_frame_bytes as u64)
        .build_layer();

    io.ns(NAMESPACE, move |socket: SocketRef| {
        on_connect(socket, Arc::clone(&state))
    });

    layer
}

fn on_connect(socket: SocketRef, state: Arc<AppState>) {
    let id = ConnectionId::from(socket.id.to_string());
    state.registry.on_connect(id.clone());
    counter!(CONNECTIONS_TOTAL).increment(1);
    info!(connection = %id, "Client connected");

    let queue = Arc::new(FrameQueue::new(state.server.frame_queue_depth));
    let received = Arc::new(AtomicU64::new(0));

    {
        let id = id.clone();
        let queue = Arc::clone(&queue);
        let received = Arc::clone(&received);
        socket.on(IMAGE_EVENT, move |Data(payload): Data<String>| {
            let sequence = received.fetch_add(1, Ordering::Relaxed);
            counter!(FRAMES_RECEIVED_TOTAL).increment(1);
            if let Some(evicted) = queue.push(FrameEvent { payload, sequence }) {
                debug!(
                    connection = %id,
                    sequence = evicted.sequence,
                    "Client ahead of processing, dropped oldest frame"
                );
                counter!(FRAMES_DROPPED_TOTAL, "reason" => "backpressure").increment(1);
            }
        });
    }

    {
        let id = id.clone();
        let queue = Arc::clone(&queue);
        let state = Arc::clone(&state);
        socket.on_disconnect(move |reason: DisconnectReason| {
            queue.close();
            state.registry.on_disconnect(&id);
            counter!(DISCONNECTIONS_TOTAL).increment(1);
            info!(
                connection = %id,
                frames = received.load(Ordering::Relaxed),
                dropped = queue.dropped(),
                reason = ?reason,
                "Client disconnected"
            );
        });
    }

    tokio::spawn(run_worker(id, state, queue, socket));
}

/// Drain the connection's queue until it is closed
async fn run_worker(
    id: ConnectionId,
    state: Arc<AppState>,
    queue: Arc<FrameQueue<FrameEvent>>,
    socket: SocketRef,
) {
    while let Some(frame) = queue.pop().await {
        let sequence = frame.sequence;
        match state.registry.on_frame(&id, frame, &state.pipeline).await {
            FrameOutcome::Processed(update) => {
                if let Err(e) = socket.emit(RESPONSE_EVENT, &update) {
                    debug!(connection = %id, error = %e, "Client gone, stopping worker");
                    break;
                }
            }
            FrameOutcome::Dropped(e) => {
                warn!(connection = %id, sequence, error = %e, "Frame dropped");
                counter!(FRAMES_DROPPED_TOTAL, "reason" => e.reason()).increment(1);
            }
            FrameOutcome::Ignored => {
                debug!(connection = %id, sequence, "Frame ignored, session closed");
            }
        }
    }
}
