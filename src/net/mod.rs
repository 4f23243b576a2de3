// AxeProfiler - net/mod.rs
//
// Device transport layer: the AxeOS HTTP client behind a trait seam.
// Dependencies: core (settings payload type), util.
// Must NOT depend on: app, platform.

pub mod client;
