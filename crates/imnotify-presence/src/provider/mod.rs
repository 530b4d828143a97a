//! Per-account connection ownership with background reconnect.
//!
//! A [`ConnectionProvider`] never makes callers wait on a reconnect: while the
//! account is down they get a [`NullConnection`](crate::NullConnection) and a
//! dedicated worker task retries with exponential backoff.

mod backoff;
mod client;
mod worker;


pub use backoff::{Backoff, ReconnectPolicy};
pub use client::ConnectionProvider;
