//! shutterlog: a self-hosted photo journal server.
//!
//! Serves a personal photo site from plain directories on disk: a
//! "moments" photo wall with EXIF-derived capture dates and background
//! thumbnails, travel journals stored as folders with JSON sidecars, an
//! about page, and an authenticated HTTP API for managing all of it.

pub mod config;
pub mod error;
pub mod metadata;
pub mod middleware;
pub mod routes;
pub mod sanitize;
pub mod server;
pub mod state;
pub mod store;
pub mod thumbs;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server};
pub use state::AppState;
