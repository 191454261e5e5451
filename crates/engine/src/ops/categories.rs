//! Category schema access.
//!
//! A category owns an open-ended list of typed attribute definitions; the
//! definitions created here are the schema products bind their values
//! against. Creation inserts the category row and all definitions in one
//! transaction, so a failing definition never leaves a half-created category
//! behind.

use std::collections::HashSet;

use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{AttributeKind, EngineError, ResultEngine, attributes, categories, products};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// A category row, schema not attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
        }
    }
}

/// One attribute definition of a category's schema.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDef {
    pub id: i32,
    pub name: String,
    pub kind: AttributeKind,
    pub is_required: bool,
}

impl TryFrom<attributes::Model> for AttributeDef {
    type Error = EngineError;

    fn try_from(model: attributes::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            kind: AttributeKind::try_from(model.kind.as_str())?,
            is_required: model.is_required,
        })
    }
}

/// Input for one attribute definition when creating a category.
#[derive(Clone, Debug)]
pub struct AttributeDefNew {
    pub name: String,
    pub kind: AttributeKind,
    pub is_required: bool,
}

/// A category together with its full attribute schema.
#[derive(Clone, Debug)]
pub struct CategoryDetail {
    pub category: Category,
    pub attributes: Vec<AttributeDef>,
}

impl Engine {
    /// Lists all active categories, schema not attached.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::IsActive.eq(true))
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    /// Returns a category with its full attribute definition list.
    pub async fn category_with_schema(&self, category_id: i32) -> ResultEngine<CategoryDetail> {
        let model = categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

        let attribute_models = attributes::Entity::find()
            .filter(attributes::Column::CategoryId.eq(category_id))
            .order_by_asc(attributes::Column::Id)
            .all(&self.database)
            .await?;

        let mut defs = Vec::with_capacity(attribute_models.len());
        for attribute_model in attribute_models {
            defs.push(AttributeDef::try_from(attribute_model)?);
        }

        Ok(CategoryDetail {
            category: Category::from(model),
            attributes: defs,
        })
    }

    /// Creates a category and its attribute definitions; returns the new id.
    ///
    /// Attribute names must be unique within the submitted set. The category
    /// and all definitions are inserted in one transaction.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        attribute_defs: Vec<AttributeDefNew>,
    ) -> ResultEngine<i32> {
        let name = normalize_required_name(name, "category")?;
        let description = normalize_optional_text(description);

        let mut seen = HashSet::new();
        let mut defs = Vec::with_capacity(attribute_defs.len());
        for def in attribute_defs {
            let def_name = normalize_required_name(&def.name, "attribute")?;
            if !seen.insert(def_name.clone()) {
                return Err(EngineError::ExistingKey(def_name));
            }
            defs.push(AttributeDefNew {
                name: def_name,
                ..def
            });
        }

        with_tx!(self, |db_tx| {
            let category = categories::ActiveModel {
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(description),
                is_active: ActiveValue::Set(true),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            for def in defs {
                attributes::ActiveModel {
                    category_id: ActiveValue::Set(category.id),
                    name: ActiveValue::Set(def.name),
                    kind: ActiveValue::Set(def.kind.as_str().to_string()),
                    is_required: ActiveValue::Set(def.is_required),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::debug!(category_id = category.id, "category created");
            Ok(category.id)
        })
    }

    /// Updates a category's core fields; attribute definitions are untouched.
    pub async fn update_category(
        &self,
        category_id: i32,
        name: &str,
        description: Option<&str>,
        is_active: bool,
    ) -> ResultEngine<()> {
        let name = normalize_required_name(name, "category")?;

        let model = categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

        let mut active: categories::ActiveModel = model.into();
        active.name = ActiveValue::Set(name);
        active.description = ActiveValue::Set(normalize_optional_text(description));
        active.is_active = ActiveValue::Set(is_active);
        active.update(&self.database).await?;

        Ok(())
    }

    /// Deletes a category and its attribute definitions.
    ///
    /// Deletion is blocked while products still reference the category;
    /// reassign or delete those products first.
    pub async fn delete_category(&self, category_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let referencing = products::Entity::find()
                .filter(products::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if referencing > 0 {
                return Err(EngineError::InUse(format!(
                    "category is referenced by {referencing} product(s)"
                )));
            }

            attributes::Entity::delete_many()
                .filter(attributes::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;

            let result = categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("category not exists".to_string()));
            }

            tracing::debug!(category_id, "category deleted");
            Ok(())
        })
    }
}
