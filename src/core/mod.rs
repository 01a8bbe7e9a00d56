pub mod batch;
pub mod checks;
pub mod concurrency_controller;
pub mod iteration;
pub mod run_batch;
pub(crate) mod share_result;
pub(crate) mod start_task;
pub mod stats;
pub mod transport;
