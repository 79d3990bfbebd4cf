//! Third-party service clients (non-Firebase).

pub mod stripe;

pub use stripe::StripeClient;
