pub mod actions;
pub mod config;
pub mod constants;
pub mod core;
pub mod decoding;
pub mod evm;
pub mod handlers;
pub mod monitor;
pub mod store;
pub mod utils;
pub mod workers;
