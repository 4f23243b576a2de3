// AxeProfiler - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// potential future programmatic use. The binary in main.rs is a thin
// bootstrap around `app::session::Session`.

pub mod app;
pub mod core;
pub mod net;
pub mod platform;
pub mod util;
