//! Service event entity - one truck visit against an order.
//!
//! `event_type` holds `"delivery"`, `"service"` or `"pickup"`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order the visit is for
    pub order_id: i64,
    /// Kind of visit
    pub event_type: String,
    /// Day the visit is planned for
    pub scheduled_date: Date,
    /// Measured septage that replaces the estimate on service visits
    pub estimated_gallons_override: Option<i32>,
}

/// Defines relationships between `ServiceEvent` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
