//! REST surface for the sponsorship-inventory pricing service.

pub mod auth;
pub mod rest;
pub mod server;

pub use rest::AppState;
pub use server::ApiServer;
