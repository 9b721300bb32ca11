// src/services/client_service.rs

use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::client::{Client, CreateClientPayload},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    pub async fn list_clients(&self, conn: &mut PgConnection) -> Result<Vec<Client>, AppError> {
        let rows = self.repo.list_active(conn).await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    // O payload já chega validado pelo handler
    pub async fn create_client(
        &self,
        conn: &mut PgConnection,
        payload: &CreateClientPayload,
    ) -> Result<Client, AppError> {
        let document = payload.document_digits();

        let row = self.repo
            .create_client(
                conn,
                payload.nome.trim(),
                &document,
                payload.email.trim(),
                payload.telefone.as_deref().map(str::trim).filter(|t| !t.is_empty()),
                payload.data_nascimento,
            )
            .await?;

        tracing::info!("👤 Cliente {} cadastrado", row.id_cliente);
        Ok(Client::from(row))
    }
}
