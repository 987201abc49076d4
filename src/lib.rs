//! Jointlab - fixed-joint collision-filter diagnostic harness
//!
//! The binary in `main.rs` drives the scene; this library exposes the
//! configuration layer so integration tests can load and inspect it.

pub mod config;
