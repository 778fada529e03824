//! Integration test common infrastructure.
//!
//! Provides utilities for spawning the bot binary, connecting gateway
//! clients, and asserting on reply flows.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::{Reply, TestClient};
#[allow(unused_imports)]
pub use server::TestBot;
