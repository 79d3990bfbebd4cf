//! Fiesta Admin - staff dashboard API.
//!
//! Privileged counterpart to the storefront: full Firestore read/write via a
//! service bearer token, staff sign-in with permission-gated CRUD panels,
//! product image upload to Cloud Storage, and demo catalog seeding.
//!
//! The crate is a library so the CLI can drive the same clients (seeding,
//! staff creation) without going through HTTP.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod firestore;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
