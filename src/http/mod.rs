//! HTTP transport layer for the RPC dispatcher
//!
//! Provides the single POST endpoint and the enveloped routing fallbacks.

pub mod handlers;
