//! Appointment booking: conflict validation and lifecycle management.

pub mod locks;
pub mod ports;
pub mod service;
pub mod validator;

pub use service::AppointmentService;
