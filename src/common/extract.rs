// src/common/extract.rs
//
// Json / Query / Path com a rejeição no formato ApiError (e no idioma do cliente),
// em vez do texto puro padrão do axum.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
};

pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(req.headers());

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::MalformedRequest {
                status: rejection.status(),
                reason: rejection.body_text(),
            }
            .to_api_error(&locale)),
        }
    }
}

pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(AppError::MalformedRequest {
                status: rejection.status(),
                reason: rejection.body_text(),
            }
            .to_api_error(&Locale::from_headers(&parts.headers))),
        }
    }
}

pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(AppError::MalformedRequest {
                status: rejection.status(),
                reason: rejection.body_text(),
            }
            .to_api_error(&Locale::from_headers(&parts.headers))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Filtro {
        #[allow(dead_code)]
        filter: Option<crate::models::billing::HistoryFilter>,
    }

    #[derive(Debug, Deserialize)]
    struct Corpo {
        #[allow(dead_code)]
        url: String,
    }

    fn app() -> Router {
        Router::new()
            .route("/historico", get(|ApiQuery(_q): ApiQuery<Filtro>| async { StatusCode::OK }))
            .route("/boletos/{id}", get(|ApiPath(id): ApiPath<Uuid>| async move { id.to_string() }))
            .route("/link", post(|ApiJson(_c): ApiJson<Corpo>| async { StatusCode::OK }))
    }

    async fn json_body(response: axum::response::Response) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    #[tokio::test]
    async fn unknown_history_filter_is_json_bad_request() -> Result<(), Box<dyn std::error::Error>> {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/historico?filter=foo").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await?;
        assert_eq!(json["error"], "A requisição é inválida.");
        assert!(json["details"]["reason"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn non_uuid_path_is_json_bad_request_in_english() -> Result<(), Box<dyn std::error::Error>> {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/boletos/nao-e-uuid")
                    .header("accept-language", "en-US")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await?;
        assert_eq!(json["error"], "The request is invalid.");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_keeps_axum_status_with_api_shape() -> Result<(), Box<dyn std::error::Error>> {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/link")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"url\":"))?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await?["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() -> Result<(), Box<dyn std::error::Error>> {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/link")
                    .method("POST")
                    .body(Body::from("{\"url\":\"https://pague.exemplo\"}"))?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(json_body(response).await?["details"]["reason"].is_string());
        Ok(())
    }

    #[test]
    fn rejection_status_is_preserved() {
        let api = AppError::MalformedRequest {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            reason: "missing field `url`".into(),
        }
        .to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
