//! services/api/src/lib.rs
//!
//! The Happy Thoughts HTTP service: configuration, storage adapters, seeding
//! and the axum web layer, built on the `happy_thoughts_core` crate.

pub mod adapters;
pub mod config;
pub mod error;
pub mod seed;
pub mod web;
