pub mod log;
pub mod user;
