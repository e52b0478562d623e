//! Internal implementation modules for `prevu-core`.
//!
//! Most callers should go through `prevu_core::api` rather than importing
//! these modules directly.

pub mod config;
pub mod detect;
pub mod neutralize;
pub mod pipeline;
pub mod runtime;
pub mod sanitize;
pub mod tooling;
