//! Company entity - the tenant every other record is scoped to.
//!
//! A company optionally points at a home-base location, which joins its customer
//! and dump-site locations in the distance matrix.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Unique identifier for the company
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the company
    pub name: String,
    /// Yard the trucks start from, if geocoded
    pub home_base_location_id: Option<i64>,
}

/// Defines relationships between Company and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Home base belongs to one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::HomeBaseLocationId",
        to = "super::location::Column::Id"
    )]
    HomeBase,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HomeBase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
