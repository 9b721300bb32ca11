pub mod auth;
pub mod billing_service;
pub mod client_service;
pub mod consumption_service;
pub mod dashboard_service;
