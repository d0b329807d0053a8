//! API Module
//!
//! HTTP handlers and routing for the token cache service.
//!
//! # Endpoints
//! - `GET /token/decode` - Decode the request's bearer token (cached)
//! - `GET /token/verify` - Verify the request's bearer token (cached)
//! - `POST /cache/cleanup` - Force a cleanup pass
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
