pub mod error;
pub mod hooks;
pub mod log_service;
pub mod ports;
pub mod repo;
pub mod user_service;
pub mod validator;
