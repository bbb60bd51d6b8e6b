//! Data structure utilities.

pub mod append_log;
