// ABOUTME: HTTP middleware for cross-origin access control
// ABOUTME: Request tracing is layered directly in the router via tower-http

pub mod cors;

// CORS configuration
pub use cors::setup_cors;
