//! Library side of the `modelwatch` binary: snapshot loading and the
//! command handlers, kept out of `main.rs` so they can be tested directly.
pub mod commands;
pub mod snapshot;
