pub mod auth;
pub mod media;
pub mod pin;
pub mod user;
