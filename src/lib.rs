//! Load generator for the appointment scheduling endpoint.
//!
//! A fixed pool of virtual users posts the same appointment to
//! `POST /consultas` until the run deadline. Each response is checked for
//! status 200 and for the absence of `error` in its body, and the checks are
//! aggregated into a [`RunResult`](models::result::RunResult).
pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod report;

pub use crate::core::batch::{batch, batch_with_transport};
pub use crate::core::run_batch::run_streaming;
pub use crate::core::transport::{ReqwestTransport, Transport};
pub use crate::error::{LoadError, TransportError};
pub use crate::models::result::{RunEvent, RunResult};
pub use crate::models::run_config::RunConfig;
