// MCP (Model Context Protocol) server exposing the DigiKey product API
// as tools for agent clients.

pub mod config;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use server::McpServer;
pub use tools::digikey_registry;
