//! Notification sinks

use forkline_model::{ForkEvent, ForkEventKind, NotificationSink, StoreError};
use tracing::info;

/// Sink that writes each event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait::async_trait]
impl NotificationSink for TracingSink {
    async fn emit(&self, event: ForkEvent) -> Result<(), StoreError> {
        match &event.kind {
            ForkEventKind::ForkCreated {
                fork_id, parent_id, ..
            } => info!(
                "Notify {}: recipe {} was forked as {}",
                event.recipient, parent_id, fork_id
            ),
            ForkEventKind::VoteCast { recipe_id, voter_id } => info!(
                "Notify {}: {} voted for recipe {}",
                event.recipient, voter_id, recipe_id
            ),
        }
        Ok(())
    }
}
