//! Initial schema migration - creates all tables from scratch.
//!
//! Four tables make up the EAV catalog:
//!
//! - `categories`: product categories with an active flag
//! - `attributes`: per-category typed attribute definitions
//! - `products`: products referencing exactly one category
//! - `product_attributes`: value bindings between products and attributes
//!
//! Attribute names are unique within a category, and a product holds at most
//! one value per attribute. Attribute definitions and value bindings cascade
//! with their owners; the product → category reference does not cascade, the
//! engine blocks deleting a category that products still reference.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    IsActive,
}

#[derive(Iden)]
enum Attributes {
    Table,
    Id,
    CategoryId,
    Name,
    Kind,
    IsRequired,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    BasePrice,
    IsActive,
}

#[derive(Iden)]
enum ProductAttributes {
    Table,
    Id,
    ProductId,
    AttributeId,
    Value,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Description).string())
                    .col(
                        ColumnDef::new(Categories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attributes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attributes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attributes::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Attributes::Name).string().not_null())
                    .col(
                        ColumnDef::new(Attributes::Kind)
                            .string()
                            .not_null()
                            .default("STRING"),
                    )
                    .col(
                        ColumnDef::new(Attributes::IsRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attributes-category_id")
                            .from(Attributes::Table, Attributes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-attributes-category_id-name-unique")
                    .table(Attributes::Table)
                    .col(Attributes::CategoryId)
                    .col(Attributes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).string())
                    .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Products::BasePrice).double().not_null())
                    .col(
                        ColumnDef::new(Products::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-category_id")
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductAttributes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductAttributes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductAttributes::ProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductAttributes::AttributeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductAttributes::Value).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_attributes-product_id")
                            .from(ProductAttributes::Table, ProductAttributes::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_attributes-attribute_id")
                            .from(ProductAttributes::Table, ProductAttributes::AttributeId)
                            .to(Attributes::Table, Attributes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-product_attributes-product_id-attribute_id-unique")
                    .table(ProductAttributes::Table)
                    .col(ProductAttributes::ProductId)
                    .col(ProductAttributes::AttributeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductAttributes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attributes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
