//! Branch and warehouse management service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Location;
use shared::validate_location_code;

/// Service for location management
#[derive(Clone)]
pub struct LocationService {
    db: PgPool,
}

/// Input for creating a branch or warehouse
#[derive(Debug, Deserialize)]
pub struct CreateLocationInput {
    pub name: String,
    pub code: String,
    pub is_warehouse: Option<bool>,
    pub address: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl LocationService {
    /// Create a new LocationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a location
    pub async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location> {
        validate_location_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
            });
        }

        let code_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM locations WHERE code = $1)")
                .bind(&input.code)
                .fetch_one(&self.db)
                .await?;

        if code_taken {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        if let Some(parent_id) = input.parent_id {
            let parent_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)",
            )
            .bind(parent_id)
            .fetch_one(&self.db)
            .await?;

            if !parent_exists {
                return Err(AppError::NotFound("Parent location".to_string()));
            }
        }

        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, code, is_warehouse, address, parent_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, code, is_warehouse, address, parent_id, is_active, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.is_warehouse.unwrap_or(false))
        .bind(&input.address)
        .bind(input.parent_id)
        .fetch_one(&self.db)
        .await?;

        Ok(location)
    }

    /// Get a location by id
    pub async fn get_location(&self, location_id: Uuid) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, code, is_warehouse, address, parent_id, is_active, created_at
            FROM locations
            WHERE id = $1
            "#,
        )
        .bind(location_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    /// List locations, warehouses first
    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, code, is_warehouse, address, parent_id, is_active, created_at
            FROM locations
            ORDER BY is_warehouse DESC, name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(locations)
    }
}
