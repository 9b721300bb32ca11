// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::SessionContext, i18n::Locale},
    models::auth::Role,
};

/// 1. O Trait que define qual perfil a rota exige
pub trait RoleDef: Send + Sync + 'static {
    const ROLE: Role;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

/// Regra pura: o perfil da sessão precisa ser exatamente o exigido.
/// Quem erra de área recebe a própria rota inicial para redirecionar.
pub fn check_role(session: &SessionContext, required: Role) -> Result<(), AppError> {
    if session.role == required {
        Ok(())
    } else {
        Err(AppError::Forbidden { required: required.as_str(), home: session.home() })
    }
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(&parts.headers);

        // A. Extrai a sessão (colocada pelo session_guard)
        let session = parts
            .extensions
            .get::<SessionContext>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

        // B. Confere o perfil
        check_role(session, T::ROLE).map_err(|e| e.to_api_error(&locale))?;

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PERFIS (TIPOS)
// ---

pub struct AdminArea;
impl RoleDef for AdminArea {
    const ROLE: Role = Role::Admin;
}

pub struct ClientArea;
impl RoleDef for ClientArea {
    const ROLE: Role = Role::Client;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use uuid::Uuid;

    fn session(role: Role) -> SessionContext {
        SessionContext { user_id: Uuid::new_v4(), email: None, role, client_id: None }
    }

    #[test]
    fn admin_can_not_enter_client_area() {
        let err = check_role(&session(Role::Admin), Role::Client).unwrap_err();
        match err {
            AppError::Forbidden { required, home } => {
                assert_eq!(required, "cliente");
                assert_eq!(home, "/admin/dashboard");
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[tokio::test]
    async fn extractor_rejects_wrong_role_with_forbidden() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(session(Role::Client));

        let result = RequireRole::<AdminArea>::from_request_parts(&mut parts, &()).await;
        let err = result.err().expect("deveria rejeitar");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn extractor_without_session_is_unauthorized() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let result = RequireRole::<ClientArea>::from_request_parts(&mut parts, &()).await;
        let err = result.err().expect("deveria rejeitar");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn extractor_accepts_matching_role() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(session(Role::Admin));

        assert!(RequireRole::<AdminArea>::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
