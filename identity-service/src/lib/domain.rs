pub mod errors;
pub mod oauth;
pub mod ports;
pub mod session;
pub mod user;
