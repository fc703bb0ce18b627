//! Application wiring: shared state, URL routing and the middleware stack

pub mod app;
pub mod state;
pub mod urls;
