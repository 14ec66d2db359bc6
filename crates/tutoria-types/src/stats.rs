//! Admin dashboard aggregate types.

use serde::{Deserialize, Serialize};

/// Aggregate usage counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Distinct users who own at least one conversation or a profile.
    pub total_users: u64,
    pub total_conversations: u64,
    pub total_messages: u64,
    pub messages_last_24h: u64,
    /// Distinct users with a message in the last seven days.
    pub active_users_last_7d: u64,
    pub avg_messages_per_conversation: f64,
}
