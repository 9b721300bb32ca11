// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        BoletoRepository, ClientRepository, DashboardRepository, InvoiceRepository,
        ProcedureGateway, UserRepository,
    },
    services::{
        auth::AuthService, billing_service::BillingService, client_service::ClientService,
        consumption_service::ConsumptionService, dashboard_service::DashboardService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Variáveis de ambiente (ou .env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub consumption_service: ConsumptionService,
    pub dashboard_service: DashboardService,
    pub billing_service: BillingService,
    pub client_service: ClientService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let procedures = ProcedureGateway::new();
        let invoice_repo = InvoiceRepository::new();

        let auth_service = AuthService::new(UserRepository::new(db_pool.clone()), jwt_secret);
        let consumption_service = ConsumptionService::new(invoice_repo.clone());
        let dashboard_service = DashboardService::new(
            DashboardRepository::new(),
            invoice_repo.clone(),
            procedures.clone(),
        );
        let billing_service = BillingService::new(invoice_repo, BoletoRepository::new(), procedures);
        let client_service = ClientService::new(ClientRepository::new());

        Self {
            db_pool,
            auth_service,
            consumption_service,
            dashboard_service,
            billing_service,
            client_service,
        }
    }
}
