//! Second-factor decision flow.
//!
//! Converts a credential bundle plus configuration into a binary verdict:
//! [`models`] holds the wire types and the TFA-method inference, [`client`]
//! performs the HTTPS exchange with the decision service, and [`offline`]
//! is the allow-list consulted only when the service cannot be reached.

pub mod client;
pub mod models;
pub mod offline;

pub use client::verify;
