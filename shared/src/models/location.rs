//! Branch and warehouse locations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A branch or warehouse holding stock.
///
/// Locations form a tree via `parent_id`; the hierarchy is informational and
/// plays no part in balance computation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub is_warehouse: bool,
    pub address: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn partition(&self) -> PartitionKind {
        PartitionKind::resolve(self.is_warehouse)
    }
}

/// Which stock partition a location's balances live in.
///
/// Warehouses hold aggregated wholesale stock, branches hold retail-facing
/// stock. Resolved once per location and passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
    Warehouse,
    Branch,
}

impl PartitionKind {
    pub fn resolve(is_warehouse: bool) -> Self {
        if is_warehouse {
            PartitionKind::Warehouse
        } else {
            PartitionKind::Branch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_follows_warehouse_flag() {
        assert_eq!(PartitionKind::resolve(true), PartitionKind::Warehouse);
        assert_eq!(PartitionKind::resolve(false), PartitionKind::Branch);
    }
}
