//! Fiesta Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across all Fiesta
//! components:
//! - `storefront` - Public-facing rental storefront API
//! - `admin` - Staff administration API
//! - `cli` - Command-line tools for seeding and staff management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no hosted-service access. Everything here is testable without a
//! network.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`records`] - One explicit record type per hosted collection
//! - [`firestore`] - Firestore wire-value model and record conversions
//! - [`cart`] - The shopping cart reducer and its persistence port
//! - [`catalog`] - Catalog filter/sort/search over in-memory product lists
//! - [`checkout`] - Checkout step state machine with per-step validation
//! - [`permissions`] - Effective permission set for staff members

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod firestore;
pub mod permissions;
pub mod records;
pub mod types;

pub use types::*;
