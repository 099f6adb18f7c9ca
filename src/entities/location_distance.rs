//! Location distance entity - cached great-circle distance for a directed pair.
//!
//! The composite primary key `(from_location_id, to_location_id)` is the upsert key,
//! so each ordered pair has at most one row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location distance database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_distances")]
pub struct Model {
    /// Origin location
    #[sea_orm(primary_key, auto_increment = false)]
    pub from_location_id: i64,
    /// Destination location
    #[sea_orm(primary_key, auto_increment = false)]
    pub to_location_id: i64,
    /// Haversine distance in kilometres
    pub distance_km: f64,
    /// When this row was last written
    pub computed_at: DateTimeUtc,
}

/// Defines relationships between `LocationDistance` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Origin point
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::FromLocationId",
        to = "super::location::Column::Id"
    )]
    FromLocation,
    /// Destination point
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::ToLocationId",
        to = "super::location::Column::Id"
    )]
    ToLocation,
}

impl ActiveModelBehavior for ActiveModel {}
