//! Product attribute binding.
//!
//! Products carry values for the attribute schema of their category. Binding
//! happens by name: every key in the submitted map that matches a defined
//! attribute name is validated against the declared kind and stored, keys
//! with no matching definition are silently discarded. Updates replace the
//! full value set, never merge, so a category change drops values the new
//! schema does not define.

use std::collections::{BTreeMap, HashMap};

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde_json::Value as JsonValue;

use crate::{
    AttributeKind, EngineError, ResultEngine, attributes, categories, product_attributes, products,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// A product row as returned by the list operation, category name joined and
/// attribute values flattened into a name → typed value map.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i32,
    pub category_name: String,
    pub base_price: f64,
    pub is_active: bool,
    pub attributes: BTreeMap<String, JsonValue>,
}

/// One bound value together with its declared kind.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSlot {
    pub value: JsonValue,
    pub kind: AttributeKind,
}

/// A single product with its name → (value, kind) map.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i32,
    pub category_name: String,
    pub base_price: f64,
    pub is_active: bool,
    pub attributes: BTreeMap<String, AttributeSlot>,
}

impl Engine {
    /// Lists all active products with their category name and flattened
    /// attribute map.
    ///
    /// The map is assembled from joined rows, one value per row; nothing is
    /// ever concatenated into a delimited string.
    pub async fn list_products(&self) -> ResultEngine<Vec<Product>> {
        let rows = products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Id)
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|(product, _)| product.id).collect();
        let mut values_by_product = self.flattened_values(&ids).await?;

        let mut out = Vec::with_capacity(rows.len());
        for (product, category) in rows {
            let Some(category) = category else { continue };
            let attributes = values_by_product.remove(&product.id).unwrap_or_default();
            out.push(Product {
                id: product.id,
                name: product.name,
                description: product.description,
                category_id: product.category_id,
                category_name: category.name,
                base_price: product.base_price,
                is_active: product.is_active,
                attributes,
            });
        }
        Ok(out)
    }

    /// Returns a single product with its name → (value, kind) map.
    pub async fn product_with_attributes(&self, product_id: i32) -> ResultEngine<ProductDetail> {
        let (product, category) = products::Entity::find_by_id(product_id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
        let category =
            category.ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

        let value_rows = product_attributes::Entity::find()
            .filter(product_attributes::Column::ProductId.eq(product_id))
            .find_also_related(attributes::Entity)
            .all(&self.database)
            .await?;

        let mut slots = BTreeMap::new();
        for (value_model, def) in value_rows {
            let Some(def) = def else { continue };
            let kind = AttributeKind::try_from(def.kind.as_str())?;
            slots.insert(
                def.name,
                AttributeSlot {
                    value: kind.render(&value_model.value),
                    kind,
                },
            );
        }

        Ok(ProductDetail {
            id: product.id,
            name: product.name,
            description: product.description,
            category_id: product.category_id,
            category_name: category.name,
            base_price: product.base_price,
            is_active: product.is_active,
            attributes: slots,
        })
    }

    /// Creates a product and binds the matching attribute values; returns the
    /// new id.
    pub async fn create_product(
        &self,
        name: &str,
        description: Option<&str>,
        category_id: i32,
        base_price: f64,
        values: &BTreeMap<String, JsonValue>,
    ) -> ResultEngine<i32> {
        let name = normalize_required_name(name, "product")?;
        let description = normalize_optional_text(description);
        validate_price(base_price)?;

        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id).await?;
            let matched = self.matched_values(&db_tx, category_id, values).await?;

            let product = products::ActiveModel {
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(description),
                category_id: ActiveValue::Set(category_id),
                base_price: ActiveValue::Set(base_price),
                is_active: ActiveValue::Set(true),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            self.insert_values(&db_tx, product.id, matched).await?;
            tracing::debug!(product_id = product.id, "product created");
            Ok(product.id)
        })
    }

    /// Updates a product's core fields and replaces its full attribute value
    /// set against the (possibly new) category's schema.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_product(
        &self,
        product_id: i32,
        name: &str,
        description: Option<&str>,
        category_id: i32,
        base_price: f64,
        is_active: bool,
        values: &BTreeMap<String, JsonValue>,
    ) -> ResultEngine<()> {
        let name = normalize_required_name(name, "product")?;
        let description = normalize_optional_text(description);
        validate_price(base_price)?;

        with_tx!(self, |db_tx| {
            let model = products::Entity::find_by_id(product_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
            self.require_category(&db_tx, category_id).await?;
            let matched = self.matched_values(&db_tx, category_id, values).await?;

            let mut active: products::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            active.description = ActiveValue::Set(description);
            active.category_id = ActiveValue::Set(category_id);
            active.base_price = ActiveValue::Set(base_price);
            active.is_active = ActiveValue::Set(is_active);
            active.update(&db_tx).await?;

            // Full replace: delete-all-then-reinsert, not a diff.
            product_attributes::Entity::delete_many()
                .filter(product_attributes::Column::ProductId.eq(product_id))
                .exec(&db_tx)
                .await?;
            self.insert_values(&db_tx, product_id, matched).await?;
            Ok(())
        })
    }

    /// Deletes a product and its attribute value rows.
    pub async fn delete_product(&self, product_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            product_attributes::Entity::delete_many()
                .filter(product_attributes::Column::ProductId.eq(product_id))
                .exec(&db_tx)
                .await?;

            let result = products::Entity::delete_by_id(product_id)
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("product not exists".to_string()));
            }
            Ok(())
        })
    }

    async fn require_category(
        &self,
        tx: &DatabaseTransaction,
        category_id: i32,
    ) -> ResultEngine<()> {
        categories::Entity::find_by_id(category_id)
            .one(tx)
            .await?
            .map(|_| ())
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    /// Matches submitted values against the category schema.
    ///
    /// Returns `(attribute_id, canonical_value)` pairs for every key with a
    /// matching definition; unmatched keys are dropped without error, a value
    /// failing its declared kind aborts the operation.
    async fn matched_values(
        &self,
        tx: &DatabaseTransaction,
        category_id: i32,
        values: &BTreeMap<String, JsonValue>,
    ) -> ResultEngine<Vec<(i32, String)>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let schema = attributes::Entity::find()
            .filter(attributes::Column::CategoryId.eq(category_id))
            .all(tx)
            .await?;

        let mut matched = Vec::new();
        for def in schema {
            if let Some(raw) = values.get(&def.name) {
                let kind = AttributeKind::try_from(def.kind.as_str())?;
                matched.push((def.id, kind.canonicalize(&def.name, raw)?));
            }
        }
        Ok(matched)
    }

    async fn insert_values(
        &self,
        tx: &DatabaseTransaction,
        product_id: i32,
        matched: Vec<(i32, String)>,
    ) -> ResultEngine<()> {
        for (attribute_id, value) in matched {
            product_attributes::ActiveModel {
                product_id: ActiveValue::Set(product_id),
                attribute_id: ActiveValue::Set(attribute_id),
                value: ActiveValue::Set(value),
                ..Default::default()
            }
            .insert(tx)
            .await?;
        }
        Ok(())
    }

    /// Flattens the value rows of many products into per-product maps.
    async fn flattened_values(
        &self,
        product_ids: &[i32],
    ) -> ResultEngine<HashMap<i32, BTreeMap<String, JsonValue>>> {
        let mut by_product: HashMap<i32, BTreeMap<String, JsonValue>> = HashMap::new();
        if product_ids.is_empty() {
            return Ok(by_product);
        }

        let rows = product_attributes::Entity::find()
            .filter(product_attributes::Column::ProductId.is_in(product_ids.to_vec()))
            .find_also_related(attributes::Entity)
            .all(&self.database)
            .await?;

        for (value_model, def) in rows {
            let Some(def) = def else { continue };
            let kind = AttributeKind::try_from(def.kind.as_str())?;
            by_product
                .entry(value_model.product_id)
                .or_default()
                .insert(def.name, kind.render(&value_model.value));
        }
        Ok(by_product)
    }
}

fn validate_price(base_price: f64) -> ResultEngine<()> {
    if !base_price.is_finite() || base_price < 0.0 {
        return Err(EngineError::InvalidValue(format!(
            "base_price must be a non-negative number, got {base_price}"
        )));
    }
    Ok(())
}
