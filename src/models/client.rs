// src/models/client.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::format::format_cpf_cnpj;

// Registro da tabela `clientes`
#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id_cliente: Uuid,
    pub nome: String,
    pub cpf_cnpj: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub nr_cliente: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id_cliente: Uuid,
    #[schema(example = "Maria Souza")]
    pub nome: String,
    #[schema(example = "12345678901")]
    pub cpf_cnpj: String,
    #[schema(example = "123.456.789-01")]
    pub cpf_cnpj_formatado: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    // Número da instalação na distribuidora
    pub nr_cliente: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "1985-06-20")]
    pub data_nascimento: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            cpf_cnpj_formatado: format_cpf_cnpj(&row.cpf_cnpj),
            id_cliente: row.id_cliente,
            nome: row.nome,
            cpf_cnpj: row.cpf_cnpj,
            email: row.email,
            telefone: row.telefone,
            nr_cliente: row.nr_cliente,
            data_nascimento: row.data_nascimento,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientPayload {
    #[validate(custom(function = "validate_nome"))]
    #[schema(example = "Maria Souza")]
    pub nome: String,

    #[validate(custom(function = "validate_cpf_cnpj"))]
    #[schema(example = "123.456.789-01")]
    pub cpf_cnpj: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    pub telefone: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "1985-06-20")]
    pub data_nascimento: Option<NaiveDate>,
}

impl CreateClientPayload {
    /// Documento só com dígitos, como é gravado no banco
    pub fn document_digits(&self) -> String {
        only_digits(&self.cpf_cnpj)
    }
}

fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

// O nome é gravado sem espaços nas pontas, então é esse valor que precisa existir
fn validate_nome(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("nome");
        err.message = Some("O nome é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_cpf_cnpj(value: &str) -> Result<(), ValidationError> {
    match only_digits(value).len() {
        11 | 14 => Ok(()),
        _ => {
            let mut err = ValidationError::new("cpf_cnpj");
            err.message = Some("Informe um CPF (11 dígitos) ou CNPJ (14 dígitos).".into());
            Err(err)
        }
    }
}
