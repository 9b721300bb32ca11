pub mod user_repo;
pub use user_repo::UserRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod boleto_repo;
pub use boleto_repo::BoletoRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod procedures;
pub use procedures::{ProcedureGateway, RemoteProcedure};
