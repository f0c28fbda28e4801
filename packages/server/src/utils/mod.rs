pub mod avatar;
pub mod hash;
pub mod jwt;
