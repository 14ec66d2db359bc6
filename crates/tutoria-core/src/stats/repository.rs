//! StatsRepository trait definition.

use tutoria_types::error::RepositoryError;
use tutoria_types::stats::DashboardStats;

/// Read-only aggregate queries over the conversation store.
pub trait StatsRepository: Send + Sync {
    /// Compute dashboard statistics as of now.
    fn dashboard_stats(
        &self,
    ) -> impl std::future::Future<Output = Result<DashboardStats, RepositoryError>> + Send;
}
