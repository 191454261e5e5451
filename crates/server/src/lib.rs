use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod categories;
mod products;
mod server;

pub mod types {
    pub mod category {
        pub use api_types::category::{
            AttributeDefNew, AttributeView, CategoryCreate, CategoryCreated, CategoryDetail,
            CategoryUpdate, CategoryView,
        };
    }

    pub mod product {
        pub use api_types::product::{
            AttributeValueView, ProductCreate, ProductCreated, ProductDetail, ProductUpdate,
            ProductView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn kind_to_api(kind: engine::AttributeKind) -> api_types::AttributeKind {
    match kind {
        engine::AttributeKind::String => api_types::AttributeKind::String,
        engine::AttributeKind::Number => api_types::AttributeKind::Number,
        engine::AttributeKind::Boolean => api_types::AttributeKind::Boolean,
        engine::AttributeKind::Date => api_types::AttributeKind::Date,
    }
}

fn kind_from_api(kind: api_types::AttributeKind) -> engine::AttributeKind {
    match kind {
        api_types::AttributeKind::String => engine::AttributeKind::String,
        api_types::AttributeKind::Number => engine::AttributeKind::Number,
        api_types::AttributeKind::Boolean => engine::AttributeKind::Boolean,
        api_types::AttributeKind::Date => engine::AttributeKind::Date,
    }
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::InvalidName(_) | EngineError::InvalidValue(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_in_use_maps_to_409() {
        let res = ServerError::from(EngineError::InUse("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidValue("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
