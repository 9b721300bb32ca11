pub mod auth;
pub mod billing;
pub mod client;
pub mod consumption;
pub mod dashboard;
