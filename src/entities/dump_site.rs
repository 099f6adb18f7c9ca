//! Dump site entity - where pumped septage is unloaded.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dump site database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dump_sites")]
pub struct Model {
    /// Unique identifier for the dump site
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning company
    pub company_id: i64,
    /// Dump site name
    pub name: String,
    /// Site location, if geocoded
    pub location_id: Option<i64>,
}

/// Defines relationships between `DumpSite` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each dump site belongs to one company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    /// Each dump site has at most one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
