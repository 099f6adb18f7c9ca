//! Rental line item entity - quantity of a unit type rented on an order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rental line item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rental_line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Rented unit type
    pub unit_type_id: i64,
    /// Number of units of this type
    pub quantity: i32,
}

/// Defines relationships between `RentalLineItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// Each line rents one unit type
    #[sea_orm(
        belongs_to = "super::unit_type::Entity",
        from = "Column::UnitTypeId",
        to = "super::unit_type::Column::Id"
    )]
    UnitType,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::unit_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnitType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
