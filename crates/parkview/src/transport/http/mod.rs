//! HTTP transport: the `GET /api/lots` data source.

mod routes;
mod server;

pub use routes::{ApiState, HealthCheckResponse, LotsQuery, routes};
pub use server::{ServerConfig, serve, serve_on};
