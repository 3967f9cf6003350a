//! Fleet tracker API models
//!
//! Wire types shared by the tracker's HTTP facade and its sync client.

pub mod models;

pub use models::*;
