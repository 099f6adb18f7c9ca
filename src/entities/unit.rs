//! Unit entity - one physical rental asset.
//!
//! `status` holds `"available"`, `"rented"` or `"maintenance"`; see
//! [`UnitStatus`](crate::core::availability::UnitStatus).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    /// Unique identifier for the unit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning company
    pub company_id: i64,
    /// Type of this unit
    pub unit_type_id: i64,
    /// Serial or asset tag painted on the unit
    pub serial: String,
    /// Current lifecycle status
    pub status: String,
}

/// Defines relationships between Unit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each unit has one type
    #[sea_orm(
        belongs_to = "super::unit_type::Entity",
        from = "Column::UnitTypeId",
        to = "super::unit_type::Column::Id"
    )]
    UnitType,
}

impl Related<super::unit_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnitType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
