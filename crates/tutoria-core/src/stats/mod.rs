//! Aggregate usage statistics for the admin dashboard.

pub mod repository;
