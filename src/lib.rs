//! Shared to-do list over TCP.
//!
//! Clients speak newline-delimited JSON. `get` returns the list to the caller,
//! `add` and `update` change it and the resulting item is sent to the caller
//! and broadcast to every other connected client.

pub mod config;
pub mod connection;
pub mod models;
pub mod server;
pub mod services;
pub mod session;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::AppState;
