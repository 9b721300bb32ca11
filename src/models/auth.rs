// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// Usuário do provedor de identidade (tabela `auth.users` do Supabase)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,

    // Hash bcrypt gerado pelo Supabase Auth. Nunca sai do servidor.
    pub encrypted_password: Option<String>,
}

// Registro da tabela `perfis`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub tipo_perfil: String,
    pub id_cliente: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(rename = "cliente")]
    Client,
}

impl Role {
    // Qualquer perfil que não seja "admin" cai na área do cliente
    pub fn from_profile(tipo_perfil: &str) -> Self {
        match tipo_perfil.trim() {
            "admin" => Role::Admin,
            _ => Role::Client,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "cliente",
        }
    }

    /// Rota inicial do painel para este perfil.
    pub fn home(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Client => "/cliente/dashboard",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "cliente@gp2p.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    #[schema(example = "/cliente/dashboard")]
    pub home: String,
}

// "Quem sou eu" para o front
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub client_id: Option<Uuid>,
    pub home: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profiles_land_on_client_area() {
        assert_eq!(Role::from_profile("admin"), Role::Admin);
        assert_eq!(Role::from_profile("cliente"), Role::Client);
        assert_eq!(Role::from_profile("parceiro"), Role::Client);
        assert_eq!(Role::Client.home(), "/cliente/dashboard");
    }

    #[test]
    fn role_serializes_with_profile_names() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"cliente\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
