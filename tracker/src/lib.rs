//! Fleet Tracker Library
//!
//! Core modules for the simulated deployment tracker and its sync client.

pub mod app;
pub mod cache;
pub mod errors;
pub mod filesys;
pub mod fleet;
pub mod http;
pub mod ledger;
pub mod logs;
pub mod server;
pub mod storage;
pub mod sync;
pub mod telemetry;
pub mod utils;
pub mod workers;
