//! The EAV catalog core.
//!
//! Categories own a dynamic schema of typed attribute definitions; products
//! belong to a category and bind values against that schema through the
//! `product_attributes` join table. [`Engine`] is the only entry point, every
//! operation returns domain structs and multi-statement writes are atomic.

pub use error::EngineError;
pub use ops::{
    AttributeDef, AttributeDefNew, AttributeSlot, Category, CategoryDetail, Engine, EngineBuilder,
    Product, ProductDetail,
};
pub use value::AttributeKind;

pub mod attributes;
pub mod categories;
mod error;
mod ops;
pub mod product_attributes;
pub mod products;
mod value;

type ResultEngine<T> = Result<T, EngineError>;
