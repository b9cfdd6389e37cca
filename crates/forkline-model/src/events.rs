//! Notification events emitted on fork creation and votes

use crate::ids::{RecipeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForkEventKind {
    /// A recipe was forked
    ForkCreated {
        /// New fork
        fork_id: RecipeId,
        /// Recipe it was forked from
        parent_id: RecipeId,
        /// Author of the fork
        forked_by: UserId,
    },
    /// A recipe received a vote
    VoteCast {
        /// Voted recipe
        recipe_id: RecipeId,
        /// Voter
        voter_id: UserId,
    },
}

/// Event delivered to the notification sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkEvent {
    /// Sortable event ID
    pub id: Ulid,
    /// User to notify
    pub recipient: UserId,
    /// Payload
    pub kind: ForkEventKind,
    /// When the event was produced
    pub occurred_at: DateTime<Utc>,
}

impl ForkEvent {
    /// Create event stamped now
    #[must_use]
    pub fn new(recipient: UserId, kind: ForkEventKind) -> Self {
        Self {
            id: Ulid::new(),
            recipient,
            kind,
            occurred_at: Utc::now(),
        }
    }
}
