//! API Module
//!
//! HTTP handlers, routing and response assembly for the script mirror.
//!
//! # Endpoints
//! - `GET <route key>` - Verified script (e.g. `/deck`, `/rog`)
//! - `GET /stats` - Outcome counters
//! - `GET /health` - Health check endpoint

pub mod assembler;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
