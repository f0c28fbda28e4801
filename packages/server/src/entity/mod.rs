pub mod media_object;
pub mod pin;
pub mod pin_like;
pub mod pin_save;
pub mod user;
