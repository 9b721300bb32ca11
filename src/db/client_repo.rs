// src/db/client_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::client::ClientRow};

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    // Clientes ativos (sem soft delete), em ordem alfabética
    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<ClientRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id_cliente, nome, cpf_cnpj, email, telefone, nr_cliente,
                   data_nascimento, created_at
            FROM clientes
            WHERE deleted_at IS NULL
            ORDER BY nome ASC
            "#,
        )
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        nome: &str,
        cpf_cnpj: &str,
        email: &str,
        telefone: Option<&str>,
        data_nascimento: Option<NaiveDate>,
    ) -> Result<ClientRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clientes (nome, cpf_cnpj, email, telefone, data_nascimento)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_cliente, nome, cpf_cnpj, email, telefone, nr_cliente,
                      data_nascimento, created_at
            "#,
        )
            .bind(nome)
            .bind(cpf_cnpj)
            .bind(email)
            .bind(telefone)
            .bind(data_nascimento)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // CPF/CNPJ é único na tabela de clientes
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::DocumentAlreadyExists;
                    }
                }
                e.into()
            })?;

        Ok(row)
    }
}
