//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-socket Connection handler,
//! and the Responder that writes replies back on a connection.

mod connection;
mod gateway;
mod responder;

pub use connection::Connection;
pub use gateway::Gateway;
