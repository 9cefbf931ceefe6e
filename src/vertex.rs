#[path = "vertex/config.rs"]
mod config;

#[path = "vertex/wire.rs"]
mod wire;

#[path = "vertex/client.rs"]
mod client;

pub use client::VertexClient;
pub use config::VertexConfig;
