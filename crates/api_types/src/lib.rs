use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of a category attribute.
///
/// Serialized as the legacy uppercase tags (`STRING`, `NUMBER`, `BOOLEAN`,
/// `DATE`) under the JSON key `type`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeKind {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
        }
    }
}

pub mod category {
    use super::*;

    /// One attribute definition in a create-category request.
    ///
    /// `type` defaults to `STRING` and `is_required` to `false` when omitted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttributeDefNew {
        pub name: String,
        #[serde(rename = "type", default)]
        pub kind: AttributeKind,
        #[serde(default)]
        pub is_required: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttributeView {
        pub id: i32,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AttributeKind,
        pub is_required: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub description: Option<String>,
        #[serde(default)]
        pub attributes: Vec<AttributeDefNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreated {
        pub message: String,
        #[serde(rename = "categoryId")]
        pub category_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: String,
        pub description: Option<String>,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub is_active: bool,
    }

    /// Category plus its full attribute schema.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDetail {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub is_active: bool,
        pub attributes: Vec<AttributeView>,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductCreate {
        pub name: String,
        pub description: Option<String>,
        pub category_id: i32,
        pub base_price: f64,
        /// Attribute name → raw value. Keys not defined by the category's
        /// schema are silently discarded.
        #[serde(default)]
        pub attributes: BTreeMap<String, serde_json::Value>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductCreated {
        pub message: String,
        #[serde(rename = "productId")]
        pub product_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductUpdate {
        pub name: String,
        pub description: Option<String>,
        pub category_id: i32,
        pub base_price: f64,
        pub is_active: bool,
        #[serde(default)]
        pub attributes: BTreeMap<String, serde_json::Value>,
    }

    /// Product as returned by the list endpoint, category name joined in and
    /// attribute values flattened to a name → value map.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub category_id: i32,
        pub category_name: String,
        pub base_price: f64,
        pub is_active: bool,
        pub attributes: BTreeMap<String, serde_json::Value>,
    }

    /// One bound attribute value with its declared type.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttributeValueView {
        pub value: serde_json::Value,
        #[serde(rename = "type")]
        pub kind: AttributeKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductDetail {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub category_id: i32,
        pub category_name: String,
        pub base_price: f64,
        pub is_active: bool,
        pub attributes: BTreeMap<String, AttributeValueView>,
    }
}

/// Generic `{message}` response for updates and deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
