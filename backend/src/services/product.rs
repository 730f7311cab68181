//! Product catalog service
//!
//! Thin management layer for the products and variants the ledger moves.
//! Stock quantities never live here; they are derived from the ledger and
//! its balance partitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductVariant};
use shared::validate_sku;

/// Service for product and variant management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub reorder_level: Option<Decimal>,
    pub expiry_alert_days: Option<i32>,
}

/// Input for creating a product variant
#[derive(Debug, Deserialize)]
pub struct CreateVariantInput {
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub sku: String,
    pub barcode: Option<String>,
}

/// Total on-hand quantity for a product across both partitions
#[derive(Debug, Clone, Serialize)]
pub struct ProductStockSummary {
    pub product_id: Uuid,
    pub warehouse_quantity: Decimal,
    pub branch_quantity: Decimal,
    pub total_quantity: Decimal,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_sku(&input.sku).map_err(|msg| AppError::Validation {
            field: "sku".to_string(),
            message: msg.to_string(),
        })?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
            });
        }

        let sku_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(&input.sku)
                .fetch_one(&self.db)
                .await?;

        if sku_taken {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let reorder_level = input.reorder_level.unwrap_or(Decimal::ZERO);
        let expiry_alert_days = input.expiry_alert_days.unwrap_or(30);

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, sku, barcode, reorder_level, expiry_alert_days)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, sku, barcode, reorder_level, expiry_alert_days,
                      has_variants, is_active, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(reorder_level)
        .bind(expiry_alert_days)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, barcode, reorder_level, expiry_alert_days,
                   has_variants, is_active, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// List products, active first
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, barcode, reorder_level, expiry_alert_days,
                   has_variants, is_active, created_at
            FROM products
            ORDER BY is_active DESC, name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Add a variant to a product and flag the product as variant-carrying.
    pub async fn create_variant(
        &self,
        product_id: Uuid,
        input: CreateVariantInput,
    ) -> AppResult<ProductVariant> {
        validate_sku(&input.sku).map_err(|msg| AppError::Validation {
            field: "sku".to_string(),
            message: msg.to_string(),
        })?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let sku_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_variants WHERE sku = $1)",
        )
        .bind(&input.sku)
        .fetch_one(&self.db)
        .await?;

        if sku_taken {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let variant = sqlx::query_as::<_, ProductVariant>(
            r#"
            INSERT INTO product_variants (product_id, name, size, color, sku, barcode)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, product_id, name, size, color, sku, barcode, is_active
            "#,
        )
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.size)
        .bind(&input.color)
        .bind(&input.sku)
        .bind(&input.barcode)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE products SET has_variants = TRUE WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(variant)
    }

    /// List variants of a product
    pub async fn list_variants(&self, product_id: Uuid) -> AppResult<Vec<ProductVariant>> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, name, size, color, sku, barcode, is_active
            FROM product_variants
            WHERE product_id = $1
            ORDER BY name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(variants)
    }

    /// Total stock for a product across all warehouses and branches.
    pub async fn stock_summary(&self, product_id: Uuid) -> AppResult<ProductStockSummary> {
        // Validate product exists
        self.get_product(product_id).await?;

        let warehouse_quantity = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantity), 0) FROM warehouse_stock WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        let branch_quantity = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantity), 0) FROM branch_stock WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(ProductStockSummary {
            product_id,
            warehouse_quantity,
            branch_quantity,
            total_quantity: warehouse_quantity + branch_quantity,
        })
    }
}
