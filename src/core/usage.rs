//! Resource usage calculation for service events.
//!
//! Works out how much trailer space, clean water and septage tank a single visit
//! consumes. The per-event rules live in one lookup table ([`EventType::policy`]);
//! [`calculate_usage`] is a pure function over that table, and
//! [`calculate_usage_for_event`] loads an event's line items and applies it.

use crate::{
    entities::{
        Order, RentalLineItem, ServiceEvent, ServiceLineItem, UnitType, rental_line_item,
        service_line_item,
    },
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use tracing::{debug, warn};

/// Handwash stations that ride on the trailer frame without taking a spot.
const FREE_HANDWASH_SLOTS: u32 = 3;
/// Trailer spots taken by one ADA unit.
const ADA_TRAILER_SPOTS: u32 = 2;

/// Kind of truck visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Units are dropped at the site
    Delivery,
    /// Units are pumped and restocked in place
    Service,
    /// Units are pumped and hauled back
    Pickup,
}

impl EventType {
    /// Every supported event type, in policy-table order.
    pub const ALL: [Self; 3] = [Self::Delivery, Self::Service, Self::Pickup];

    /// Name as stored in `service_events.event_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Service => "service",
            Self::Pickup => "pickup",
        }
    }

    /// Consumption coefficients for this kind of visit.
    #[must_use]
    pub const fn policy(self) -> UsagePolicy {
        match self {
            Self::Delivery => UsagePolicy {
                moves_units: true,
                water_per_toilet: 5,
                water_per_handwash: 20,
                septage_per_toilet: 0,
                septage_per_serviced_unit: 0,
                honors_override: false,
            },
            Self::Service => UsagePolicy {
                moves_units: false,
                water_per_toilet: 7,
                water_per_handwash: 0,
                septage_per_toilet: 10,
                septage_per_serviced_unit: 10,
                honors_override: true,
            },
            Self::Pickup => UsagePolicy {
                moves_units: true,
                water_per_toilet: 1,
                water_per_handwash: 0,
                septage_per_toilet: 10,
                septage_per_serviced_unit: 0,
                honors_override: false,
            },
        }
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| Error::UnsupportedEventType {
                event_type: s.to_string(),
            })
    }
}

/// Capacity-relevant category of a unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitCategory {
    /// Standard portable toilet
    Standard,
    /// Wheelchair-accessible toilet, double width on the trailer
    Ada,
    /// Handwash station (not a toilet)
    Handwash,
}

impl UnitCategory {
    /// Name as stored in `unit_types.category`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Ada => "ada",
            Self::Handwash => "handwash",
        }
    }
}

impl FromStr for UnitCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(Self::Standard),
            "ada" => Ok(Self::Ada),
            "handwash" => Ok(Self::Handwash),
            other => Err(Error::UnknownValue {
                kind: "unit category",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-event coefficients. Gallons are per unit per visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsagePolicy {
    /// Whether the visit hauls units on the trailer
    pub moves_units: bool,
    /// Clean water per toilet
    pub water_per_toilet: u32,
    /// Clean water per handwash station
    pub water_per_handwash: u32,
    /// Septage pumped per toilet
    pub septage_per_toilet: u32,
    /// Septage pumped per service-only unit
    pub septage_per_serviced_unit: u32,
    /// Whether a measured gallons override replaces the septage estimate
    pub honors_override: bool,
}

/// Unit quantities on an order, bucketed by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineItemTotals {
    /// Standard toilets rented
    pub standard: u32,
    /// ADA toilets rented
    pub ada: u32,
    /// Handwash stations rented
    pub handwash: u32,
    /// Units serviced under service-only line items
    pub serviced_units: u32,
}

impl LineItemTotals {
    /// Adds `quantity` units of `category`, saturating at `u32::MAX`.
    pub const fn add(&mut self, category: UnitCategory, quantity: u32) {
        match category {
            UnitCategory::Standard => self.standard = self.standard.saturating_add(quantity),
            UnitCategory::Ada => self.ada = self.ada.saturating_add(quantity),
            UnitCategory::Handwash => self.handwash = self.handwash.saturating_add(quantity),
        }
    }

    /// Standard plus ADA units; handwash stations are not toilets.
    #[must_use]
    pub const fn toilets(&self) -> u32 {
        self.standard.saturating_add(self.ada)
    }

    /// Trailer spots needed to haul every rented unit.
    #[must_use]
    pub const fn trailer_spots(&self) -> u32 {
        self.standard
            .saturating_add(ADA_TRAILER_SPOTS.saturating_mul(self.ada))
            .saturating_add(self.handwash.saturating_sub(FREE_HANDWASH_SLOTS))
    }
}

/// Resources one visit consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    /// Trailer spots occupied
    pub trailer_spots: u32,
    /// Clean water carried, in gallons
    pub clean_water_gallons: u32,
    /// Septage pumped, in gallons
    pub septage_gallons: u32,
}

impl ResourceUsage {
    /// Whether this usage stays within every limit.
    #[must_use]
    pub const fn fits_within(&self, limits: &CapacityLimits) -> bool {
        self.trailer_spots <= limits.trailer_spots
            && self.clean_water_gallons <= limits.clean_water_gallons
            && self.septage_gallons <= limits.septage_gallons
    }
}

impl Add for ResourceUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            trailer_spots: self.trailer_spots.saturating_add(rhs.trailer_spots),
            clean_water_gallons: self
                .clean_water_gallons
                .saturating_add(rhs.clean_water_gallons),
            septage_gallons: self.septage_gallons.saturating_add(rhs.septage_gallons),
        }
    }
}

impl Sum for ResourceUsage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// What a truck and trailer can carry on one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLimits {
    /// Trailer spots available
    pub trailer_spots: u32,
    /// Clean water tank size, in gallons
    pub clean_water_gallons: u32,
    /// Septage tank size, in gallons
    pub septage_gallons: u32,
}

/// Applies the event's policy to an order's line-item totals.
///
/// `serviced_units` only counts where the policy charges septage for them (service
/// visits), and `gallons_override` only replaces the estimate where the policy honors
/// it.
#[must_use]
pub const fn calculate_usage(
    event_type: EventType,
    totals: &LineItemTotals,
    gallons_override: Option<u32>,
) -> ResourceUsage {
    let policy = event_type.policy();
    let toilets = totals.toilets();

    let trailer_spots = if policy.moves_units {
        totals.trailer_spots()
    } else {
        0
    };
    // Saturating, so an oversized order can only over-count
    let clean_water_gallons = toilets
        .saturating_mul(policy.water_per_toilet)
        .saturating_add(totals.handwash.saturating_mul(policy.water_per_handwash));
    let estimated_septage = toilets
        .saturating_mul(policy.septage_per_toilet)
        .saturating_add(
            totals
                .serviced_units
                .saturating_mul(policy.septage_per_serviced_unit),
        );
    let septage_gallons = match gallons_override {
        Some(gallons) if policy.honors_override => gallons,
        _ => estimated_septage,
    };

    ResourceUsage {
        trailer_spots,
        clean_water_gallons,
        septage_gallons,
    }
}

/// Negative stored quantities count as zero.
fn non_negative(quantity: i32) -> u32 {
    u32::try_from(quantity).unwrap_or(0)
}

/// Sums an order's rental line items by unit category and its service-only line items.
///
/// Rental lines whose unit type has no capacity-tracked category contribute nothing.
pub async fn load_line_item_totals<C>(db: &C, order_id: i64) -> Result<LineItemTotals>
where
    C: ConnectionTrait,
{
    let mut totals = LineItemTotals::default();

    let rentals = RentalLineItem::find()
        .filter(rental_line_item::Column::OrderId.eq(order_id))
        .find_also_related(UnitType)
        .all(db)
        .await?;

    for (line, unit_type) in rentals {
        let Some(unit_type) = unit_type else {
            warn!(
                "Rental line {} on order {} references missing unit type {}",
                line.id, order_id, line.unit_type_id
            );
            continue;
        };
        match UnitCategory::from_str(&unit_type.category) {
            Ok(category) => totals.add(category, non_negative(line.quantity)),
            Err(_) => debug!(
                "Unit type '{}' ({}) is not capacity-tracked, skipping",
                unit_type.name, unit_type.category
            ),
        }
    }

    totals.serviced_units = ServiceLineItem::find()
        .filter(service_line_item::Column::OrderId.eq(order_id))
        .all(db)
        .await?
        .iter()
        .map(|line| non_negative(line.units_serviced))
        .fold(0, u32::saturating_add);

    Ok(totals)
}

/// Computes the resources a stored service event consumes.
///
/// # Errors
/// * `Error::ServiceEventNotFound` / `Error::OrderNotFound` for dangling IDs
/// * `Error::UnsupportedEventType` if the stored event type is not one of the three
///   known visits
/// * `Error::Database` on query failure
pub async fn calculate_usage_for_event<C>(db: &C, event_id: i64) -> Result<ResourceUsage>
where
    C: ConnectionTrait,
{
    let event = ServiceEvent::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(Error::ServiceEventNotFound { id: event_id })?;
    let event_type = EventType::from_str(&event.event_type)?;

    let order = Order::find_by_id(event.order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: event.order_id })?;

    let totals = load_line_item_totals(db, order.id).await?;
    let usage = calculate_usage(
        event_type,
        &totals,
        event.estimated_gallons_override.map(non_negative),
    );

    debug!(
        "Usage for {} event {} on order {}: {:?}",
        event_type.as_str(),
        event_id,
        order.id,
        usage
    );
    Ok(usage)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    const MIXED_ORDER: LineItemTotals = LineItemTotals {
        standard: 2,
        ada: 1,
        handwash: 5,
        serviced_units: 0,
    };

    #[test]
    fn test_delivery_usage() {
        let usage = calculate_usage(EventType::Delivery, &MIXED_ORDER, None);
        assert_eq!(
            usage,
            ResourceUsage {
                trailer_spots: 6,
                clean_water_gallons: 115,
                septage_gallons: 0,
            }
        );
    }

    #[test]
    fn test_service_usage() {
        let usage = calculate_usage(EventType::Service, &MIXED_ORDER, None);
        assert_eq!(
            usage,
            ResourceUsage {
                trailer_spots: 0,
                clean_water_gallons: 21,
                septage_gallons: 30,
            }
        );
    }

    #[test]
    fn test_service_counts_service_only_units() {
        let totals = LineItemTotals {
            serviced_units: 2,
            ..MIXED_ORDER
        };
        let usage = calculate_usage(EventType::Service, &totals, None);
        assert_eq!(usage.septage_gallons, 50);
        assert_eq!(usage.clean_water_gallons, 21);
    }

    #[test]
    fn test_service_override_wins() {
        let totals = LineItemTotals {
            serviced_units: 2,
            ..MIXED_ORDER
        };
        let usage = calculate_usage(EventType::Service, &totals, Some(75));
        assert_eq!(usage.septage_gallons, 75);
    }

    #[test]
    fn test_pickup_usage() {
        let usage = calculate_usage(EventType::Pickup, &MIXED_ORDER, None);
        assert_eq!(
            usage,
            ResourceUsage {
                trailer_spots: 6,
                clean_water_gallons: 3,
                septage_gallons: 30,
            }
        );
    }

    #[test]
    fn test_delivery_and_pickup_ignore_serviced_units_and_override() {
        let totals = LineItemTotals {
            serviced_units: 4,
            ..MIXED_ORDER
        };
        for event_type in [EventType::Delivery, EventType::Pickup] {
            assert_eq!(
                calculate_usage(event_type, &totals, Some(999)),
                calculate_usage(event_type, &MIXED_ORDER, None),
                "{} should not change with service-only units",
                event_type.as_str()
            );
        }
    }

    #[test]
    fn test_handwash_spots_start_after_three() {
        let mut totals = LineItemTotals::default();
        totals.add(UnitCategory::Handwash, 3);
        assert_eq!(totals.trailer_spots(), 0);
        totals.add(UnitCategory::Handwash, 1);
        assert_eq!(totals.trailer_spots(), 1);
    }

    #[test]
    fn test_empty_order_uses_nothing() {
        for event_type in EventType::ALL {
            assert_eq!(
                calculate_usage(event_type, &LineItemTotals::default(), None),
                ResourceUsage::default()
            );
        }
    }

    #[test]
    fn test_event_type_names_round_trip() {
        for event_type in EventType::ALL {
            assert_eq!(
                EventType::from_str(event_type.as_str()).unwrap(),
                event_type
            );
        }
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result = EventType::from_str("inspection");
        assert!(matches!(
            result,
            Err(Error::UnsupportedEventType { event_type }) if event_type == "inspection"
        ));
    }

    #[test]
    fn test_route_usage_sums_and_checks_capacity() {
        let stops = [
            calculate_usage(EventType::Delivery, &MIXED_ORDER, None),
            calculate_usage(EventType::Service, &MIXED_ORDER, None),
        ];
        let total: ResourceUsage = stops.into_iter().sum();
        assert_eq!(
            total,
            ResourceUsage {
                trailer_spots: 6,
                clean_water_gallons: 136,
                septage_gallons: 30,
            }
        );

        let truck = CapacityLimits {
            trailer_spots: 6,
            clean_water_gallons: 150,
            septage_gallons: 300,
        };
        assert!(total.fits_within(&truck));
        let small_trailer = CapacityLimits {
            trailer_spots: 5,
            ..truck
        };
        assert!(!total.fits_within(&small_trailer));
    }

    async fn mixed_order_fixture(db: &DatabaseConnection) -> Result<i64> {
        let company = create_test_company(db, "Acme Sanitation").await?;
        let standard = create_test_unit_type(db, company.id, "Standard", "standard").await?;
        let ada = create_test_unit_type(db, company.id, "ADA", "ada").await?;
        let handwash = create_test_unit_type(db, company.id, "Handwash", "handwash").await?;
        let order = create_test_order(
            db,
            company.id,
            date("2024-01-01"),
            date("2024-01-10"),
            "scheduled",
        )
        .await?;
        add_rental_line(db, order.id, standard.id, 2).await?;
        add_rental_line(db, order.id, ada.id, 1).await?;
        add_rental_line(db, order.id, handwash.id, 5).await?;
        Ok(order.id)
    }

    #[tokio::test]
    async fn test_usage_for_stored_events() -> Result<()> {
        let db = setup_test_db().await?;
        let order_id = mixed_order_fixture(&db).await?;

        let delivery = create_test_service_event(&db, order_id, "delivery", None).await?;
        let service = create_test_service_event(&db, order_id, "service", None).await?;
        let pickup = create_test_service_event(&db, order_id, "pickup", None).await?;

        let usage = calculate_usage_for_event(&db, delivery.id).await?;
        assert_eq!(usage.trailer_spots, 6);
        assert_eq!(usage.clean_water_gallons, 115);

        let usage = calculate_usage_for_event(&db, service.id).await?;
        assert_eq!(usage.septage_gallons, 30);

        add_service_line(&db, order_id, 2).await?;
        let usage = calculate_usage_for_event(&db, service.id).await?;
        assert_eq!(usage.septage_gallons, 50);

        // Service-only units never ride the trailer
        let usage = calculate_usage_for_event(&db, pickup.id).await?;
        assert_eq!(
            usage,
            ResourceUsage {
                trailer_spots: 6,
                clean_water_gallons: 3,
                septage_gallons: 30,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_huge_quantities_saturate_instead_of_overflowing() -> Result<()> {
        let db = setup_test_db().await?;
        let company = create_test_company(&db, "Acme Sanitation").await?;
        let handwash = create_test_unit_type(&db, company.id, "Handwash", "handwash").await?;
        let ada = create_test_unit_type(&db, company.id, "ADA", "ada").await?;
        let order = create_test_order(
            &db,
            company.id,
            date("2024-01-01"),
            date("2024-01-10"),
            "scheduled",
        )
        .await?;
        add_rental_line(&db, order.id, handwash.id, 300_000_000).await?;
        add_rental_line(&db, order.id, ada.id, i32::MAX).await?;
        add_rental_line(&db, order.id, ada.id, i32::MAX).await?;
        let delivery = create_test_service_event(&db, order.id, "delivery", None).await?;

        let usage = calculate_usage_for_event(&db, delivery.id).await?;
        assert_eq!(usage.trailer_spots, u32::MAX);
        assert_eq!(usage.clean_water_gallons, u32::MAX);

        let truck = CapacityLimits {
            trailer_spots: 12,
            clean_water_gallons: 500,
            septage_gallons: 1000,
        };
        assert!(!(usage + usage).fits_within(&truck));
        Ok(())
    }

    #[tokio::test]
    async fn test_stored_override_applies_to_service() -> Result<()> {
        let db = setup_test_db().await?;
        let order_id = mixed_order_fixture(&db).await?;
        let service = create_test_service_event(&db, order_id, "service", Some(75)).await?;

        let usage = calculate_usage_for_event(&db, service.id).await?;
        assert_eq!(usage.septage_gallons, 75);
        Ok(())
    }

    #[tokio::test]
    async fn test_stored_unknown_event_type_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let order_id = mixed_order_fixture(&db).await?;
        let event = create_test_service_event(&db, order_id, "swap", None).await?;

        let result = calculate_usage_for_event(&db, event.id).await;
        assert!(matches!(
            result,
            Err(Error::UnsupportedEventType { event_type }) if event_type == "swap"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_event_is_reported() -> Result<()> {
        let db = setup_test_db().await?;
        let result = calculate_usage_for_event(&db, 42).await;
        assert!(matches!(result, Err(Error::ServiceEventNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_and_untracked_lines_contribute_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let company = create_test_company(&db, "Acme Sanitation").await?;
        let standard = create_test_unit_type(&db, company.id, "Standard", "standard").await?;
        let tank = create_test_unit_type(&db, company.id, "Holding Tank", "tank").await?;
        let order = create_test_order(
            &db,
            company.id,
            date("2024-01-01"),
            date("2024-01-10"),
            "scheduled",
        )
        .await?;
        add_rental_line(&db, order.id, standard.id, 0).await?;
        add_rental_line(&db, order.id, tank.id, 4).await?;

        let totals = load_line_item_totals(&db, order.id).await?;
        assert_eq!(totals, LineItemTotals::default());
        Ok(())
    }
}
