// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// O erro "de domínio": serviços e repositórios só conhecem este tipo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Perfil sem cliente vinculado")]
    ClientNotLinked,

    // `home` é a rota inicial de quem tentou acessar a área errada
    #[error("Acesso restrito à área {required}")]
    Forbidden { required: &'static str, home: &'static str },

    #[error("Documento já cadastrado")]
    DocumentAlreadyExists,

    #[error("{resource} não encontrado(a)")]
    NotFound { resource: &'static str },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Período inválido: {0}")]
    InvalidPeriod(String),

    // Corpo, query ou path recusado pelo extrator do axum
    #[error("Requisição malformada: {reason}")]
    MalformedRequest { status: StatusCode, reason: String },

    // A função remota respondeu `success: false`
    #[error("Falha em {procedure}: {message}")]
    ProcedureFailed { procedure: &'static str, message: String },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Resposta remota malformada: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O formato que vai para o fio
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ProfileNotFound | AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::ClientNotLinked | AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::DocumentAlreadyExists | AppError::InvalidStatusTransition { .. } => {
                StatusCode::CONFLICT
            }
            AppError::ProcedureFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MalformedRequest { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para o erro de API, com a mensagem no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let status = self.status();
        let pt = locale.is_portuguese();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let message = if pt { "Um ou mais campos são inválidos." } else { "One or more fields are invalid." };
                (message.to_string(), Some(json!(details)))
            }
            AppError::InvalidCredentials => {
                (pick(pt, "E-mail ou senha inválidos.", "Invalid e-mail or password."), None)
            }
            AppError::InvalidToken | AppError::UserNotFound => (
                pick(pt, "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
                None,
            ),
            AppError::ProfileNotFound => {
                (pick(pt, "Perfil de acesso não encontrado.", "Access profile not found."), None)
            }
            AppError::ClientNotLinked => (
                pick(pt, "Seu perfil não está vinculado a um cliente.", "Your profile is not linked to a client."),
                None,
            ),
            AppError::Forbidden { required, home } => {
                let message = if pt {
                    format!("Acesso restrito à área {}.", required)
                } else {
                    format!("This area is restricted to {}.", required)
                };
                (message, Some(json!({ "home": home })))
            }
            AppError::DocumentAlreadyExists => {
                (pick(pt, "Este CPF/CNPJ já está cadastrado.", "This CPF/CNPJ is already registered."), None)
            }
            AppError::NotFound { resource } => {
                let message = if pt { format!("{} não encontrado(a).", resource) } else { format!("{} not found.", resource) };
                (message, None)
            }
            AppError::InvalidStatusTransition { from, to } => {
                let message = if pt {
                    format!("Não é possível mudar o status de '{}' para '{}'.", from, to)
                } else {
                    format!("Cannot change status from '{}' to '{}'.", from, to)
                };
                (message, Some(json!({ "from": from, "to": to })))
            }
            AppError::InvalidPeriod(raw) => {
                let message = if pt { format!("Período inválido: '{}'.", raw) } else { format!("Invalid period: '{}'.", raw) };
                (message, None)
            }
            AppError::MalformedRequest { reason, .. } => {
                (pick(pt, "A requisição é inválida.", "The request is invalid."), Some(json!({ "reason": reason })))
            }
            AppError::ProcedureFailed { procedure, message } => {
                let headline = if pt { "A operação foi recusada pelo servidor de faturamento." } else { "The billing backend rejected the operation." };
                (headline.to_string(), Some(json!({ "procedure": procedure, "reason": message })))
            }

            // Todo o resto vira 500. O detalhe fica no log, não na resposta.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (pick(pt, "Ocorreu um erro inesperado.", "An unexpected error occurred."), None)
            }
        };

        ApiError { status, error, details }
    }
}

fn pick(pt: bool, portuguese: &str, english: &str) -> String {
    if pt { portuguese.to_string() } else { english.to_string() }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
