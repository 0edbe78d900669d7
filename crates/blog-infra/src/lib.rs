//! # Blog Infra
//!
//! Infrastructure adapters for the Devblog backend: SeaORM repositories,
//! the chunked attachment store, token and password services, and
//! in-memory fallbacks used without a database.

pub mod auth;
pub mod database;
pub mod memory;
