//! HTTP host for the attendance gate.
//!
//! Serves the password prompt, the forced password change form and the
//! gated home page on top of [`attendance_gate::Authenticator`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod purge;
