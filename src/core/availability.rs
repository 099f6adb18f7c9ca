//! Inventory availability for one tenant.
//!
//! Answers "how many units of a type are free between two dates" by comparing the
//! tenant's unit counts with the distinct units assigned to overlapping orders. An
//! order overlaps a window when `order.start_date <= end && order.end_date >= start`.
//!
//! [`AvailabilityEngine`] memoizes every aggregate it runs for the lifetime of the
//! instance. Build one per request and drop it afterwards; nothing is shared across
//! instances, so there is no invalidation to manage when orders or units change.

use crate::{
    entities::{Order, OrderUnit, Unit, order, order_unit, unit},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    FromQueryResult, QuerySelect, Select,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::str::FromStr;
use tracing::{debug, trace};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    /// Being drafted, reserves nothing
    Draft,
    /// Quoted to the customer, reserves nothing
    Quoted,
    /// Confirmed and upcoming
    Scheduled,
    /// Units are on site
    Active,
    /// Units are back in the yard
    Completed,
    /// Called off
    Cancelled,
}

/// Statuses that reserve units for the order's date range.
pub const BLOCKING_STATUSES: [OrderStatus; 2] = [OrderStatus::Scheduled, OrderStatus::Active];

impl OrderStatus {
    /// Every status.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Quoted,
        Self::Scheduled,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Name as stored in `orders.status`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Quoted => "quoted",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::UnknownValue {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

/// How an order-to-unit assignment is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BillingPeriod {
    /// Recurring monthly rental
    Monthly,
    /// One-off event rental
    PerEvent,
}

impl BillingPeriod {
    /// Name as stored in `order_units.billing_period`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::PerEvent => "per_event",
        }
    }
}

impl FromStr for BillingPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "per_event" => Ok(Self::PerEvent),
            other => Err(Error::UnknownValue {
                kind: "billing period",
                value: other.to_string(),
            }),
        }
    }
}

/// Physical status of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitStatus {
    /// In the yard
    Available,
    /// Out on an order
    Rented,
    /// Being repaired, never offered
    Maintenance,
}

impl UnitStatus {
    /// Name as stored in `units.status`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Maintenance => "maintenance",
        }
    }
}

/// Which aggregate a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum QueryKind {
    Rented,
    RentedByPeriod,
}

/// Cache key: query kind, window, and the status set in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: QueryKind,
    start: NaiveDate,
    end: NaiveDate,
    statuses: Vec<OrderStatus>,
}

impl CacheKey {
    fn new(kind: QueryKind, start: NaiveDate, end: NaiveDate, statuses: &[OrderStatus]) -> Self {
        let mut statuses = statuses.to_vec();
        statuses.sort_unstable();
        statuses.dedup();
        Self {
            kind,
            start,
            end,
            statuses,
        }
    }
}

/// Rented unit counts keyed by `(unit_type_id, billing period)`.
///
/// Plain rented queries use `None` for the period.
type RentalCounts = HashMap<(i64, Option<BillingPeriod>), u64>;

/// Request-scoped memo of aggregate results.
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    totals: Option<HashMap<i64, u64>>,
    rentals: HashMap<CacheKey, RentalCounts>,
}

impl AvailabilityCache {
    /// Number of distinct rental aggregates held.
    #[must_use]
    pub fn rental_entries(&self) -> usize {
        self.rentals.len()
    }
}

#[derive(Debug, FromQueryResult)]
pub(crate) struct TypeCount {
    pub(crate) unit_type_id: i64,
    pub(crate) unit_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TypePeriodCount {
    unit_type_id: i64,
    billing_period: String,
    unit_count: i64,
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Units left after subtracting rentals, clamped at zero when overbooked.
#[must_use]
pub const fn available_from(total: u64, rented: u64) -> u64 {
    total.saturating_sub(rented)
}

fn distinct_unit_count() -> SimpleExpr {
    Expr::cust("COUNT(DISTINCT \"order_units\".\"unit_id\")")
}

/// Order-unit rows of this tenant's orders with one of `statuses` that overlap the window.
pub(crate) fn overlapping_assignments(
    company_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    statuses: &[OrderStatus],
) -> Select<order_unit::Entity> {
    OrderUnit::find()
        .inner_join(Order)
        .filter(order::Column::CompanyId.eq(company_id))
        .filter(order::Column::Status.is_in(statuses.iter().map(|status| status.as_str())))
        .filter(order::Column::StartDate.lte(end))
        .filter(order::Column::EndDate.gte(start))
}

async fn query_rentals<C>(db: &C, company_id: i64, key: &CacheKey) -> Result<RentalCounts>
where
    C: ConnectionTrait,
{
    let assignments = overlapping_assignments(company_id, key.start, key.end, &key.statuses)
        .inner_join(Unit)
        .select_only()
        .column(unit::Column::UnitTypeId);

    let mut counts = RentalCounts::new();
    match key.kind {
        QueryKind::Rented => {
            let rows = assignments
                .column_as(distinct_unit_count(), "unit_count")
                .group_by(unit::Column::UnitTypeId)
                .into_model::<TypeCount>()
                .all(db)
                .await?;
            for row in rows {
                counts.insert((row.unit_type_id, None), count_to_u64(row.unit_count));
            }
        }
        QueryKind::RentedByPeriod => {
            let rows = assignments
                .column(order_unit::Column::BillingPeriod)
                .column_as(distinct_unit_count(), "unit_count")
                .group_by(unit::Column::UnitTypeId)
                .group_by(order_unit::Column::BillingPeriod)
                .into_model::<TypePeriodCount>()
                .all(db)
                .await?;
            for row in rows {
                let period = BillingPeriod::from_str(&row.billing_period)?;
                counts.insert(
                    (row.unit_type_id, Some(period)),
                    count_to_u64(row.unit_count),
                );
            }
        }
    }

    debug!(
        "Loaded {:?} for company {} over {}..={} ({} groups)",
        key.kind,
        company_id,
        key.start,
        key.end,
        counts.len()
    );
    Ok(counts)
}

async fn query_totals<C>(db: &C, company_id: i64) -> Result<HashMap<i64, u64>>
where
    C: ConnectionTrait,
{
    let rows = Unit::find()
        .select_only()
        .column(unit::Column::UnitTypeId)
        .column_as(
            SimpleExpr::from(Func::count(Expr::col((unit::Entity, unit::Column::Id)))),
            "unit_count",
        )
        .filter(unit::Column::CompanyId.eq(company_id))
        .group_by(unit::Column::UnitTypeId)
        .into_model::<TypeCount>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.unit_type_id, count_to_u64(row.unit_count)))
        .collect())
}

/// Tenant-scoped availability queries with a per-instance cache.
///
/// Each distinct `(kind, window, statuses)` combination costs one grouped query
/// covering every unit type, no matter how many types are then asked about.
#[derive(Debug)]
pub struct AvailabilityEngine<'a, C> {
    db: &'a C,
    company_id: i64,
    cache: AvailabilityCache,
}

impl<'a, C> AvailabilityEngine<'a, C>
where
    C: ConnectionTrait,
{
    /// Creates an engine with a cold cache.
    #[must_use]
    pub fn new(db: &'a C, company_id: i64) -> Self {
        Self {
            db,
            company_id,
            cache: AvailabilityCache::default(),
        }
    }

    /// Tenant this engine answers for.
    #[must_use]
    pub const fn company_id(&self) -> i64 {
        self.company_id
    }

    /// The memoized results gathered so far.
    #[must_use]
    pub const fn cache(&self) -> &AvailabilityCache {
        &self.cache
    }

    async fn totals(&mut self) -> Result<&HashMap<i64, u64>> {
        if self.cache.totals.is_none() {
            let totals = query_totals(self.db, self.company_id).await?;
            self.cache.totals = Some(totals);
        } else {
            trace!("Unit totals cache hit for company {}", self.company_id);
        }
        Ok(self.cache.totals.get_or_insert_with(HashMap::new))
    }

    async fn rentals(
        &mut self,
        kind: QueryKind,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[OrderStatus],
    ) -> Result<&RentalCounts> {
        match self.cache.rentals.entry(CacheKey::new(kind, start, end, statuses)) {
            Entry::Occupied(entry) => {
                trace!("Rental cache hit for {:?}", entry.key());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let counts = query_rentals(self.db, self.company_id, entry.key()).await?;
                Ok(entry.insert(counts))
            }
        }
    }

    /// Number of units of `unit_type_id` the tenant owns, in any status.
    pub async fn total_units(&mut self, unit_type_id: i64) -> Result<u64> {
        Ok(self
            .totals()
            .await?
            .get(&unit_type_id)
            .copied()
            .unwrap_or(0))
    }

    /// Distinct units of `unit_type_id` assigned to overlapping orders in `statuses`.
    ///
    /// An empty status set matches no orders and returns 0 without querying.
    pub async fn rented_count(
        &mut self,
        unit_type_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[OrderStatus],
    ) -> Result<u64> {
        if statuses.is_empty() {
            return Ok(0);
        }
        Ok(self
            .rentals(QueryKind::Rented, start, end, statuses)
            .await?
            .get(&(unit_type_id, None))
            .copied()
            .unwrap_or(0))
    }

    /// `total_units - rented_count`, never below zero.
    pub async fn available_count(
        &mut self,
        unit_type_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[OrderStatus],
    ) -> Result<u64> {
        let total = self.total_units(unit_type_id).await?;
        let rented = self.rented_count(unit_type_id, start, end, statuses).await?;
        let available = available_from(total, rented);
        if rented > total {
            debug!(
                "Unit type {} overbooked for company {}: {} rented of {}",
                unit_type_id, self.company_id, rented, total
            );
        }
        Ok(available)
    }

    /// Rented count restricted to assignments billed by `billing_period`.
    pub async fn rental_count_for_period(
        &mut self,
        unit_type_id: i64,
        billing_period: BillingPeriod,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[OrderStatus],
    ) -> Result<u64> {
        if statuses.is_empty() {
            return Ok(0);
        }
        Ok(self
            .rentals(QueryKind::RentedByPeriod, start, end, statuses)
            .await?
            .get(&(unit_type_id, Some(billing_period)))
            .copied()
            .unwrap_or(0))
    }

    /// Every `(unit_type_id, billing_period)` bucket with units out in the window.
    ///
    /// Shares its cache entry with [`Self::rental_count_for_period`].
    pub async fn units_out_by_period(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[OrderStatus],
    ) -> Result<HashMap<(i64, BillingPeriod), u64>> {
        if statuses.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .rentals(QueryKind::RentedByPeriod, start, end, statuses)
            .await?
            .iter()
            .filter_map(|(&(unit_type_id, period), &count)| {
                period.map(|period| ((unit_type_id, period), count))
            })
            .collect())
    }
}
