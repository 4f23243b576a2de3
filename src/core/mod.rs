// AxeProfiler - core/mod.rs
//
// Core business logic layer: the profile data model, validation, and pure
// partial-update diffing.
// Dependencies: standard library and serde_json values only.
// Must NOT depend on: app, net, or platform layers, or perform I/O.

pub mod model;
pub mod profile;
