//! Learner profile persistence.

pub mod repository;
