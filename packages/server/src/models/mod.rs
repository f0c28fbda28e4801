pub mod auth;
pub mod pin;
pub mod shared;
pub mod user;
