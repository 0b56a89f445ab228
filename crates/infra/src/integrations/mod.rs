//! Integrations with external services.

pub mod calcom;
