//! Ad-hoc availability summary for quoting.
//!
//! A stateless, uncached view: for one tenant and one date window, how many units of
//! every type are free for the whole window and not in maintenance. The bounds arrive
//! as raw text from callers; an unparseable or inverted range produces an empty
//! summary, and [`AvailabilitySummary::valid_range`] tells the caller which case
//! it is.

use crate::{
    core::availability::{
        BLOCKING_STATUSES, OrderStatus, TypeCount, UnitStatus, count_to_u64,
        overlapping_assignments,
    },
    entities::{Unit, UnitType, order_unit, unit, unit_type},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    QueryOrder, QuerySelect, QueryTrait,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use std::collections::HashMap;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Free units of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTypeAvailability {
    /// The unit type
    pub unit_type: unit_type::Model,
    /// Units free for the whole window
    pub available: u64,
}

/// Availability of every unit type over one requested window.
#[derive(Debug, Clone)]
pub struct AvailabilitySummary {
    company_id: i64,
    raw_start: String,
    raw_end: String,
    range: Option<(NaiveDate, NaiveDate)>,
    statuses: Vec<OrderStatus>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

impl AvailabilitySummary {
    /// Parses the window bounds (`YYYY-MM-DD`). Never fails; check [`Self::valid_range`].
    #[must_use]
    pub fn new(company_id: i64, start_date: &str, end_date: &str) -> Self {
        let range = match (parse_date(start_date), parse_date(end_date)) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        };
        Self {
            company_id,
            raw_start: start_date.to_string(),
            raw_end: end_date.to_string(),
            range,
            statuses: BLOCKING_STATUSES.to_vec(),
        }
    }

    /// Replaces the statuses that make a unit unavailable.
    #[must_use]
    pub fn with_statuses(mut self, statuses: &[OrderStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Whether both bounds parsed and `start <= end`.
    #[must_use]
    pub const fn valid_range(&self) -> bool {
        self.range.is_some()
    }

    /// The parsed window.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateRange` carrying the raw bounds when the range is invalid.
    pub fn window(&self) -> Result<(NaiveDate, NaiveDate)> {
        self.range.ok_or_else(|| Error::InvalidDateRange {
            start: self.raw_start.clone(),
            end: self.raw_end.clone(),
        })
    }

    /// Every tenant unit type ordered by name with its free-unit count.
    ///
    /// Returns an empty list without touching the database when the range is invalid.
    pub async fn summary<C>(&self, db: &C) -> Result<Vec<UnitTypeAvailability>>
    where
        C: ConnectionTrait,
    {
        let Ok((start, end)) = self.window() else {
            debug!(
                "Invalid availability range '{}'..'{}', returning empty summary",
                self.raw_start, self.raw_end
            );
            return Ok(Vec::new());
        };

        let unit_types = UnitType::find()
            .filter(unit_type::Column::CompanyId.eq(self.company_id))
            .order_by_asc(unit_type::Column::Name)
            .all(db)
            .await?;

        let booked_units = overlapping_assignments(self.company_id, start, end, &self.statuses)
            .select_only()
            .column(order_unit::Column::UnitId)
            .into_query();

        let free: HashMap<i64, u64> = Unit::find()
            .select_only()
            .column(unit::Column::UnitTypeId)
            .column_as(
                SimpleExpr::from(Func::count(Expr::col((unit::Entity, unit::Column::Id)))),
                "unit_count",
            )
            .filter(unit::Column::CompanyId.eq(self.company_id))
            .filter(unit::Column::Status.ne(UnitStatus::Maintenance.as_str()))
            .filter(unit::Column::Id.not_in_subquery(booked_units))
            .group_by(unit::Column::UnitTypeId)
            .into_model::<TypeCount>()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.unit_type_id, count_to_u64(row.unit_count)))
            .collect();

        Ok(unit_types
            .into_iter()
            .map(|unit_type| {
                let available = free.get(&unit_type.id).copied().unwrap_or(0);
                UnitTypeAvailability {
                    unit_type,
                    available,
                }
            })
            .collect())
    }
}
