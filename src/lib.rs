pub mod constants;
pub mod engine;
pub mod log_store;
pub mod network;
pub mod rng;
pub mod server_protocol;
pub mod types;
