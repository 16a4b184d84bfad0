//! Type-safe argument modules.
//!
//! Each struct here implements `ScriptArgs` and maps Rust fields to the exact
//! flags and environment variables its external program expects.

pub mod component;
pub mod systemctl;
