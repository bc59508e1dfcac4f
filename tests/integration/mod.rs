//! Integration test modules for MDC
//!
//! - controller: Byte input, channel routing, status
//! - chains: Allocation strategies and registry errors
//! - processing: Processing lifecycle and timer-driven cutoffs

pub mod chains;
pub mod controller;
pub mod processing;
