//! ProfileRepository trait definition.

use tutoria_types::error::RepositoryError;
use tutoria_types::profile::UserProfile;

/// Repository trait for per-user learner profiles.
///
/// Profiles are validated before they reach the repository; implementations
/// store what they are given.
pub trait ProfileRepository: Send + Sync {
    /// Get a user's profile, or `None` if they never saved one.
    fn get_profile(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    /// Create or replace a user's profile.
    fn upsert_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
