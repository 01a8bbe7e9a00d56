pub mod api_endpoint;
pub mod check_stats;
pub mod http_error_stats;
pub mod payload;
pub mod response;
pub mod result;
pub mod run_config;
