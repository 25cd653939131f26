//! Inspection validation and webhook delivery, free of I/O
//!
//! [`models`] holds the data, [`services`] the rules applied to it, and
//! [`ports`] the traits through which services reach storage and the network.

pub mod models;
pub mod ports;
pub mod services;
