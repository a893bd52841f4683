//! Handlers behind each `modelwatch` subcommand.
pub mod detect;
pub mod entity;
pub mod export;
pub mod summary;
