//! Remote service module
//!
//! Wire formats and the client for the backend that supplies the watched
//! app-name list and receives detection reports.

pub mod client;
pub mod models;

pub use client::{HttpRemoteService, RemoteService};
pub use models::{Ack, DetectionReport, LoginOutcome, RegisterRequest};
