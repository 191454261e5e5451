//! Categories API endpoints.

use api_types::category::{
    AttributeView, CategoryCreate, CategoryCreated, CategoryDetail, CategoryUpdate, CategoryView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, kind_from_api, kind_to_api, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        is_active: category.is_active,
    }
}

fn map_attribute(def: engine::AttributeDef) -> AttributeView {
    AttributeView {
        id: def.id,
        name: def.name,
        kind: kind_to_api(def.kind),
        is_required: def.is_required,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
) -> Result<Json<CategoryDetail>, ServerError> {
    let detail = state.engine.category_with_schema(category_id).await?;
    Ok(Json(CategoryDetail {
        id: detail.category.id,
        name: detail.category.name,
        description: detail.category.description,
        is_active: detail.category.is_active,
        attributes: detail.attributes.into_iter().map(map_attribute).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let defs = payload
        .attributes
        .into_iter()
        .map(|def| engine::AttributeDefNew {
            name: def.name,
            kind: kind_from_api(def.kind),
            is_required: def.is_required,
        })
        .collect();

    let category_id = state
        .engine
        .create_category(&payload.name, payload.description.as_deref(), defs)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryCreated {
            message: "Category created successfully".to_string(),
            category_id,
        }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<api_types::Message>, ServerError> {
    state
        .engine
        .update_category(
            category_id,
            &payload.name,
            payload.description.as_deref(),
            payload.is_active,
        )
        .await?;
    Ok(Json(api_types::Message {
        message: "Category updated successfully".to_string(),
    }))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
) -> Result<Json<api_types::Message>, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(Json(api_types::Message {
        message: "Category deleted successfully".to_string(),
    }))
}
