//! Broadcast bus for tone and rebuild events.
//!
//! Subscribers (the SSE endpoint, tests) each get their own receiver. A
//! slow subscriber that falls behind loses the oldest events.

use chrono::{DateTime, Utc};
use color_tones::{CountAdjusted, RebuildReport};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

/// Event payload, tagged by `type` when serialized
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToneEvent {
    /// A movement threshold crossing produced a tone
    TonePlay {
        tone: usize,
        since_last_tone: f64,
        lifetime: f64,
    },
    /// Uniform quantization produced fewer colors than requested
    ColorCountAdjusted {
        requested_k: usize,
        actual_k: usize,
        message: String,
    },
    /// A rebuild finished and a new palette is active
    PaletteRebuilt {
        palette_size: usize,
        unique_colors: usize,
    },
    /// A rebuild failed; the previous palette stays active
    RebuildFailed { error: String },
}

impl ToneEvent {
    /// SSE event name, same as the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            ToneEvent::TonePlay { .. } => "tone_play",
            ToneEvent::ColorCountAdjusted { .. } => "color_count_adjusted",
            ToneEvent::PaletteRebuilt { .. } => "palette_rebuilt",
            ToneEvent::RebuildFailed { .. } => "rebuild_failed",
        }
    }
}

impl From<&CountAdjusted> for ToneEvent {
    fn from(adj: &CountAdjusted) -> Self {
        ToneEvent::ColorCountAdjusted {
            requested_k: adj.requested_k,
            actual_k: adj.actual_k,
            message: adj.message.clone(),
        }
    }
}

/// Event with the time it was published
#[derive(Debug, Clone, Serialize)]
pub struct Stamped {
    #[serde(flatten)]
    pub event: ToneEvent,
    pub timestamp: DateTime<Utc>,
}

/// Fan-out channel for [`ToneEvent`]s
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Stamped>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ToneEvent) {
        let stamped = Stamped {
            event,
            timestamp: Utc::now(),
        };
        let _ = self.sender.send(stamped);
    }

    /// Publish the events that describe a successful rebuild.
    pub fn publish_rebuild(&self, report: &RebuildReport) {
        if let Some(adj) = &report.adjustment {
            self.publish(ToneEvent::from(adj));
        }
        self.publish(ToneEvent::PaletteRebuilt {
            palette_size: report.palette_size,
            unique_colors: report.unique_colors,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Stamped> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
