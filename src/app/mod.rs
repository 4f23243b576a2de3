// AxeProfiler - app/mod.rs
//
// Application layer: profile persistence and the interactive session.
// Dependencies: core, net (trait seam only), util.
// Must NOT depend on: platform specifics.

pub mod session;
pub mod store;
