//! Cal.com booking-platform integration.

mod gateway;
mod types;

pub use gateway::CalcomGateway;
