//! Products API endpoints.

use api_types::product::{
    AttributeValueView, ProductCreate, ProductCreated, ProductDetail, ProductUpdate, ProductView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, kind_to_api, server::ServerState};

fn map_product(product: engine::Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        description: product.description,
        category_id: product.category_id,
        category_name: product.category_name,
        base_price: product.base_price,
        is_active: product.is_active,
        attributes: product.attributes,
    }
}

fn map_detail(detail: engine::ProductDetail) -> ProductDetail {
    ProductDetail {
        id: detail.id,
        name: detail.name,
        description: detail.description,
        category_id: detail.category_id,
        category_name: detail.category_name,
        base_price: detail.base_price,
        is_active: detail.is_active,
        attributes: detail
            .attributes
            .into_iter()
            .map(|(name, slot)| {
                (
                    name,
                    AttributeValueView {
                        value: slot.value,
                        kind: kind_to_api(slot.kind),
                    },
                )
            })
            .collect(),
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ProductView>>, ServerError> {
    let products = state
        .engine
        .list_products()
        .await?
        .into_iter()
        .map(map_product)
        .collect();
    Ok(Json(products))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(product_id): Path<i32>,
) -> Result<Json<ProductDetail>, ServerError> {
    let detail = state.engine.product_with_attributes(product_id).await?;
    Ok(Json(map_detail(detail)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> Result<(StatusCode, Json<ProductCreated>), ServerError> {
    let product_id = state
        .engine
        .create_product(
            &payload.name,
            payload.description.as_deref(),
            payload.category_id,
            payload.base_price,
            &payload.attributes,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            message: "Product created successfully".to_string(),
            product_id,
        }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(product_id): Path<i32>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<api_types::Message>, ServerError> {
    state
        .engine
        .update_product(
            product_id,
            &payload.name,
            payload.description.as_deref(),
            payload.category_id,
            payload.base_price,
            payload.is_active,
            &payload.attributes,
        )
        .await?;
    Ok(Json(api_types::Message {
        message: "Product updated successfully".to_string(),
    }))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(product_id): Path<i32>,
) -> Result<Json<api_types::Message>, ServerError> {
    state.engine.delete_product(product_id).await?;
    Ok(Json(api_types::Message {
        message: "Product deleted successfully".to_string(),
    }))
}
