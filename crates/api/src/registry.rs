//! Session registry
//!
//! Owns one `SessionState` per open connection. Each connection's frames are
//! applied by that connection's worker only, one at a time, so a session is
//! never mutated concurrently; the map itself only guards insert/remove.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dms::{DmsConfig, Observation, SessionState, StatusUpdate};
use metrics::{counter, gauge, histogram};
use tracing::{debug, info};

use crate::metrics::{
    FRAMES_PROCESSED_TOTAL, FRAME_PROCESSING_SECONDS, SESSIONS_ACTIVE, STATUS_TRANSITIONS_TOTAL,
};
use crate::pipeline::{FrameError, FramePipeline};

/// Opaque connection identifier (the transport's socket id)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub String);

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound `image` event with its per-connection sequence number
#[derive(Debug, Clone)]
pub struct FrameEvent {
    pub payload: String,
    pub sequence: u64,
}

/// Result of handling one frame
#[derive(Debug)]
pub enum FrameOutcome {
    /// Applied; send this update to the client
    Processed(StatusUpdate),
    /// Decode or extraction failed; session untouched, nothing to send
    Dropped(FrameError),
    /// No session for the connection (never opened or already closed)
    Ignored,
}

/// Registry of live sessions keyed by connection
pub struct SessionRegistry {
    sessions: DashMap<ConnectionId, SessionState>,
    config: DmsConfig,
}

impl SessionRegistry {
    pub fn new(config: DmsConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Create a session; returns false (and keeps the existing one) on a duplicate id
    pub fn on_connect(&self, id: ConnectionId) -> bool {
        let created = match self.sessions.entry(id) {
            Entry::Occupied(entry) => {
                debug!(connection = %entry.key(), "Duplicate connect ignored");
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(SessionState::new());
                true
            }
        };
        gauge!(SESSIONS_ACTIVE).set(self.sessions.len() as f64);
        created
    }

    /// Drop a session; returns false if there was none
    pub fn on_disconnect(&self, id: &ConnectionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if !removed {
            debug!(connection = %id, "Disconnect for unknown connection");
        }
        gauge!(SESSIONS_ACTIVE).set(self.sessions.len() as f64);
        removed
    }

    /// Decode, analyze and apply one frame for a connection
    ///
    /// The analysis runs off the async runtime. If the connection closes
    /// meanwhile, the result is discarded and `Ignored` returned.
    pub async fn on_frame(
        &self,
        id: &ConnectionId,
        frame: FrameEvent,
        pipeline: &Arc<FramePipeline>,
    ) -> FrameOutcome {
        if !self.contains(id) {
            debug!(connection = %id, sequence = frame.sequence, "Frame for unknown connection");
            return FrameOutcome::Ignored;
        }

        let started = Instant::now();
        let observation = match pipeline.analyze_blocking(frame.payload, frame.sequence).await {
            Ok(observation) => observation,
            Err(e) => return FrameOutcome::Dropped(e),
        };
        histogram!(FRAME_PROCESSING_SECONDS).record(started.elapsed().as_secs_f64());

        self.apply(id, observation)
    }

    /// Apply an already analyzed observation
    pub fn apply(&self, id: &ConnectionId, observation: Observation) -> FrameOutcome {
        let Some(mut session) = self.sessions.get_mut(id) else {
            debug!(connection = %id, "Discarding result for closed connection");
            return FrameOutcome::Ignored;
        };

        let previous = session.status;
        let status = session.observe(observation, &self.config);
        drop(session);

        if status != previous {
            info!(connection = %id, from = %previous, to = %status, "Status changed");
            counter!(STATUS_TRANSITIONS_TOTAL, "status" => status.as_str()).increment(1);
        }
        counter!(FRAMES_PROCESSED_TOTAL).increment(1);

        FrameOutcome::Processed(StatusUpdate::after(status, &observation))
    }

    /// Copy of a session's state
    pub fn snapshot(&self, id: &ConnectionId) -> Option<SessionState> {
        self.sessions.get(id).map(|s| s.clone())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
