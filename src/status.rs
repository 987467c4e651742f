use crate::constants::STATUS_DISPLAY_SECS;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: Severity,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
struct Slot {
    current: Option<StatusMessage>,
    generation: u64,
}

/// Single-slot notification sink. Success and error messages auto-clear
/// after the display window; informational ones persist until replaced.
/// The generation counter keeps a stale clear task from wiping a newer
/// message.
#[derive(Clone, Default)]
pub struct StatusSink {
    slot: Arc<Mutex<Slot>>,
}

impl StatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn report(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        tracing::debug!("status [{:?}]: {}", severity, message);

        let generation = {
            let mut slot = self.slot.lock().await;
            slot.generation += 1;
            slot.current = Some(StatusMessage {
                message,
                severity,
                at: Utc::now(),
            });
            slot.generation
        };

        if severity != Severity::Info {
            let slot = Arc::clone(&self.slot);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(STATUS_DISPLAY_SECS)).await;
                let mut slot = slot.lock().await;
                if slot.generation == generation {
                    slot.current = None;
                }
            });
        }
    }

    pub async fn current(&self) -> Option<StatusMessage> {
        self.slot.lock().await.current.clone()
    }
}
