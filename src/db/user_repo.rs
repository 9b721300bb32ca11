// src/db/user_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthUser, Profile, Role},
};

// Usuários do Supabase Auth (`auth.users`) e seus perfis de acesso (`perfis`).
// Roda antes de existir sessão, por isso usa a pool diretamente.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AppError> {
        let maybe_user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT id, email::text AS email, encrypted_password
            FROM auth.users
            WHERE lower(email) = lower($1)
              AND deleted_at IS NULL
            "#,
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AppError> {
        let maybe_user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT id, email::text AS email, encrypted_password
            FROM auth.users
            WHERE id = $1
              AND deleted_at IS NULL
            "#,
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT tipo_perfil, id_cliente FROM perfis WHERE id_perfil = $1",
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    // Primeiro login sem perfil: entra como cliente, ainda sem vínculo
    pub async fn create_default_profile(&self, user_id: Uuid) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO perfis (id_perfil, tipo_perfil)
            VALUES ($1, $2)
            ON CONFLICT (id_perfil) DO UPDATE SET id_perfil = EXCLUDED.id_perfil
            RETURNING tipo_perfil, id_cliente
            "#,
        )
            .bind(user_id)
            .bind(Role::Client.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }
}
