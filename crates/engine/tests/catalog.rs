use std::collections::BTreeMap;

use sea_orm::Database;
use serde_json::{Value, json};

use engine::{AttributeDefNew, AttributeKind, Engine, EngineError};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn shoe_schema() -> Vec<AttributeDefNew> {
    vec![
        AttributeDefNew {
            name: "color".to_string(),
            kind: AttributeKind::String,
            is_required: false,
        },
        AttributeDefNew {
            name: "size".to_string(),
            kind: AttributeKind::Number,
            is_required: true,
        },
        AttributeDefNew {
            name: "waterproof".to_string(),
            kind: AttributeKind::Boolean,
            is_required: false,
        },
        AttributeDefNew {
            name: "released".to_string(),
            kind: AttributeKind::Date,
            is_required: false,
        },
    ]
}

fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[tokio::test]
async fn category_round_trips_its_schema() {
    let engine = engine_with_db().await;

    let category_id = engine
        .create_category("Shoes", Some("Footwear"), shoe_schema())
        .await
        .unwrap();

    let detail = engine.category_with_schema(category_id).await.unwrap();
    assert_eq!(detail.category.name, "Shoes");
    assert_eq!(detail.category.description.as_deref(), Some("Footwear"));
    assert!(detail.category.is_active);

    assert_eq!(detail.attributes.len(), 4);
    let size = detail
        .attributes
        .iter()
        .find(|def| def.name == "size")
        .unwrap();
    assert_eq!(size.kind, AttributeKind::Number);
    assert!(size.is_required);
}

#[tokio::test]
async fn duplicate_attribute_names_rejected_atomically() {
    let engine = engine_with_db().await;

    let mut defs = shoe_schema();
    defs.push(AttributeDefNew {
        name: "color".to_string(),
        kind: AttributeKind::Number,
        is_required: false,
    });

    let err = engine
        .create_category("Shoes", None, defs)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("color".to_string()));

    // Nothing was inserted.
    assert!(engine.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_names_are_invalid() {
    let engine = engine_with_db().await;

    assert!(matches!(
        engine.create_category("   ", None, Vec::new()).await,
        Err(EngineError::InvalidName(_))
    ));
    assert!(matches!(
        engine
            .create_category(
                "Shoes",
                None,
                vec![AttributeDefNew {
                    name: "".to_string(),
                    kind: AttributeKind::String,
                    is_required: false,
                }],
            )
            .await,
        Err(EngineError::InvalidName(_))
    ));
}

#[tokio::test]
async fn update_category_touches_core_fields_only() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    engine
        .update_category(category_id, "Footwear", Some("renamed"), false)
        .await
        .unwrap();

    let detail = engine.category_with_schema(category_id).await.unwrap();
    assert_eq!(detail.category.name, "Footwear");
    assert!(!detail.category.is_active);
    assert_eq!(detail.attributes.len(), 4);

    // Inactive categories drop out of the active list but stay fetchable.
    assert!(engine.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_category_is_key_not_found() {
    let engine = engine_with_db().await;

    assert!(matches!(
        engine.category_with_schema(999).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.update_category(999, "x", None, true).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_category(999).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn product_round_trips_matching_attributes() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    let input = values(&[
        ("color", json!("red")),
        ("size", json!(42)),
        ("waterproof", json!(true)),
        ("released", json!("2024-03-01")),
    ]);
    let product_id = engine
        .create_product("Trail runner", Some("All-terrain"), category_id, 89.99, &input)
        .await
        .unwrap();

    let detail = engine.product_with_attributes(product_id).await.unwrap();
    assert_eq!(detail.category_name, "Shoes");
    assert_eq!(detail.base_price, 89.99);
    assert_eq!(detail.attributes.len(), 4);
    assert_eq!(detail.attributes["color"].value, json!("red"));
    assert_eq!(detail.attributes["size"].value, json!(42.0));
    assert_eq!(detail.attributes["size"].kind, AttributeKind::Number);
    assert_eq!(detail.attributes["waterproof"].value, json!(true));
    assert_eq!(detail.attributes["released"].value, json!("2024-03-01"));
}

#[tokio::test]
async fn unknown_attribute_names_are_dropped() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    let input = values(&[("color", json!("red")), ("warranty", json!("2 years"))]);
    let product_id = engine
        .create_product("Trail runner", None, category_id, 10.0, &input)
        .await
        .unwrap();

    let detail = engine.product_with_attributes(product_id).await.unwrap();
    assert_eq!(detail.attributes.len(), 1);
    assert!(detail.attributes.contains_key("color"));
}

#[tokio::test]
async fn mistyped_value_aborts_product_creation() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    let input = values(&[("size", json!("large"))]);
    let err = engine
        .create_product("Trail runner", None, category_id, 10.0, &input)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidValue(_)));

    // Nothing was committed together with the failed value.
    assert!(engine.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_price_is_rejected() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    let err = engine
        .create_product("Trail runner", None, category_id, -1.0, &BTreeMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidValue(_)));
}

#[tokio::test]
async fn update_replaces_the_full_value_set() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    let product_id = engine
        .create_product(
            "Trail runner",
            None,
            category_id,
            89.99,
            &values(&[("color", json!("red")), ("size", json!(42))]),
        )
        .await
        .unwrap();

    engine
        .update_product(
            product_id,
            "Trail runner",
            None,
            category_id,
            79.99,
            true,
            &values(&[("waterproof", json!(false))]),
        )
        .await
        .unwrap();

    let detail = engine.product_with_attributes(product_id).await.unwrap();
    assert_eq!(detail.base_price, 79.99);
    assert_eq!(detail.attributes.len(), 1);
    assert_eq!(detail.attributes["waterproof"].value, json!(false));
}

#[tokio::test]
async fn category_change_drops_values_outside_the_new_schema() {
    let engine = engine_with_db().await;
    let shoes = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();
    let hats = engine
        .create_category(
            "Hats",
            None,
            vec![AttributeDefNew {
                name: "color".to_string(),
                kind: AttributeKind::String,
                is_required: false,
            }],
        )
        .await
        .unwrap();

    let product_id = engine
        .create_product(
            "Trail runner",
            None,
            shoes,
            89.99,
            &values(&[("color", json!("red")), ("size", json!(42))]),
        )
        .await
        .unwrap();

    engine
        .update_product(
            product_id,
            "Trail cap",
            None,
            hats,
            19.99,
            true,
            &values(&[("color", json!("red")), ("size", json!(42))]),
        )
        .await
        .unwrap();

    let detail = engine.product_with_attributes(product_id).await.unwrap();
    assert_eq!(detail.category_id, hats);
    // "size" is not part of the Hats schema, so it was dropped.
    assert_eq!(detail.attributes.len(), 1);
    assert!(detail.attributes.contains_key("color"));
}

#[tokio::test]
async fn list_products_returns_only_active_with_flattened_values() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();

    let first = engine
        .create_product(
            "Trail runner",
            None,
            category_id,
            89.99,
            &values(&[("color", json!("red"))]),
        )
        .await
        .unwrap();
    let second = engine
        .create_product("Road runner", None, category_id, 99.99, &BTreeMap::new())
        .await
        .unwrap();

    engine
        .update_product(
            second,
            "Road runner",
            None,
            category_id,
            99.99,
            false,
            &BTreeMap::new(),
        )
        .await
        .unwrap();

    let listed = engine.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first);
    assert_eq!(listed[0].category_name, "Shoes");
    assert_eq!(listed[0].attributes["color"], json!("red"));
}

#[tokio::test]
async fn delete_product_removes_its_value_rows() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();
    let product_id = engine
        .create_product(
            "Trail runner",
            None,
            category_id,
            89.99,
            &values(&[("color", json!("red"))]),
        )
        .await
        .unwrap();

    engine.delete_product(product_id).await.unwrap();
    assert!(matches!(
        engine.product_with_attributes(product_id).await,
        Err(EngineError::KeyNotFound(_))
    ));

    // With no referencing products left, the category can go too.
    engine.delete_category(category_id).await.unwrap();
}

#[tokio::test]
async fn delete_category_blocked_while_products_reference_it() {
    let engine = engine_with_db().await;
    let category_id = engine
        .create_category("Shoes", None, shoe_schema())
        .await
        .unwrap();
    engine
        .create_product("Trail runner", None, category_id, 10.0, &BTreeMap::new())
        .await
        .unwrap();

    let err = engine.delete_category(category_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    // Category and schema untouched.
    let detail = engine.category_with_schema(category_id).await.unwrap();
    assert_eq!(detail.attributes.len(), 4);
}

#[tokio::test]
async fn missing_product_is_key_not_found() {
    let engine = engine_with_db().await;

    assert!(matches!(
        engine.product_with_attributes(999).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_product(999).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .update_product(999, "x", None, 1, 1.0, true, &BTreeMap::new())
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}
