//! Service clients for the admin dashboard.

pub mod auth;
pub mod storage;

pub use auth::StaffAuthClient;
pub use storage::StorageClient;
