//! Unit type entity - a tenant's category of rental unit.
//!
//! `category` holds `"standard"`, `"ada"` or `"handwash"`; see
//! [`UnitCategory`](crate::core::usage::UnitCategory).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unit type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unit_types")]
pub struct Model {
    /// Unique identifier for the unit type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning company
    pub company_id: i64,
    /// Display name (e.g. "Standard Toilet")
    pub name: String,
    /// Category tag used for capacity accounting
    pub category: String,
}

/// Defines relationships between `UnitType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each unit type belongs to one company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
