//! Distance matrix maintenance.
//!
//! Route planning reads distances from the `location_distances` cache and never
//! computes them itself. Whenever a location is geocoded or moved, call
//! [`update_location_distances`] to rewrite every pair between that location and
//! the other located points of each company that uses it.
//!
//! Both directions of a pair are written by one statement, and each company's
//! refresh runs in its own transaction: a failed upsert rolls that company back
//! and the error goes to the caller, which is expected to retry the whole update.

use crate::{
    entities::{
        Company, Customer, DumpSite, Location, LocationDistance, company, customer, dump_site,
        location, location_distance,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// Great-circle distance in kilometres on a spherical Earth.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let half_d_lat = (to.lat - from.lat).to_radians() / 2.0;
    let half_d_lng = (to.lng - from.lng).to_radians() / 2.0;

    let h = half_d_lat.sin().powi(2) + lat1.cos() * lat2.cos() * half_d_lng.sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin()
}

/// Outcome of one location's refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceUpdateReport {
    /// Location that triggered the refresh
    pub location_id: i64,
    /// Companies whose matrices were refreshed
    pub companies: Vec<i64>,
    /// Pairs written (each pair is two directed rows)
    pub pairs_upserted: usize,
    /// Candidate locations skipped for missing coordinates
    pub skipped_without_coordinates: usize,
}

impl DistanceUpdateReport {
    /// Whether nothing was written.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.pairs_upserted == 0
    }
}

/// Companies that reference `location_id` as a customer site, a dump site or their
/// home base.
pub async fn relevant_company_ids<C>(db: &C, location_id: i64) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    let mut ids = BTreeSet::new();

    ids.extend(
        Customer::find()
            .filter(customer::Column::LocationId.eq(location_id))
            .all(db)
            .await?
            .into_iter()
            .map(|customer| customer.company_id),
    );
    ids.extend(
        DumpSite::find()
            .filter(dump_site::Column::LocationId.eq(location_id))
            .all(db)
            .await?
            .into_iter()
            .map(|site| site.company_id),
    );
    ids.extend(
        Company::find()
            .filter(company::Column::HomeBaseLocationId.eq(location_id))
            .all(db)
            .await?
            .into_iter()
            .map(|company| company.id),
    );

    Ok(ids)
}

/// Every location a company routes between: customer sites, dump sites and the home
/// base.
pub async fn company_location_ids<C>(db: &C, company_id: i64) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    let mut ids = BTreeSet::new();

    ids.extend(
        Customer::find()
            .filter(customer::Column::CompanyId.eq(company_id))
            .all(db)
            .await?
            .into_iter()
            .filter_map(|customer| customer.location_id),
    );
    ids.extend(
        DumpSite::find()
            .filter(dump_site::Column::CompanyId.eq(company_id))
            .all(db)
            .await?
            .into_iter()
            .filter_map(|site| site.location_id),
    );
    if let Some(company) = Company::find_by_id(company_id).one(db).await? {
        ids.extend(company.home_base_location_id);
    }

    Ok(ids)
}

/// Writes `a -> b` and `b -> a` with the same distance in one statement.
async fn upsert_pair<C>(
    db: &C,
    a: i64,
    b: i64,
    distance_km: f64,
    computed_at: DateTimeUtc,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = |from_location_id, to_location_id| location_distance::ActiveModel {
        from_location_id: Set(from_location_id),
        to_location_id: Set(to_location_id),
        distance_km: Set(distance_km),
        computed_at: Set(computed_at),
    };

    LocationDistance::insert_many([row(a, b), row(b, a)])
        .on_conflict(
            OnConflict::columns([
                location_distance::Column::FromLocationId,
                location_distance::Column::ToLocationId,
            ])
            .update_columns([
                location_distance::Column::DistanceKm,
                location_distance::Column::ComputedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Rewrites every cached distance between `location_id` and the other located points
/// of each company that references it.
///
/// A location without coordinates is a no-op. Self pairs and candidates without
/// coordinates are skipped. Re-running with unchanged coordinates overwrites the same
/// rows and refreshes `computed_at`.
///
/// # Errors
/// * `Error::LocationNotFound` if the location does not exist
/// * `Error::Database` if any read or upsert fails; the failing company's writes are
///   rolled back and later companies are not attempted
#[instrument(skip(db))]
pub async fn update_location_distances(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<DistanceUpdateReport> {
    let mut report = DistanceUpdateReport {
        location_id,
        ..Default::default()
    };

    let origin = Location::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or(Error::LocationNotFound { id: location_id })?;
    let Some(origin_point) = origin.coordinates() else {
        debug!("Location {} has no coordinates, nothing to update", location_id);
        return Ok(report);
    };

    let company_ids = relevant_company_ids(db, location_id).await?;
    let computed_at = Utc::now();

    for &company_id in &company_ids {
        let candidate_ids: Vec<i64> = company_location_ids(db, company_id)
            .await?
            .into_iter()
            .filter(|&id| id != location_id)
            .collect();
        let candidates = Location::find()
            .filter(location::Column::Id.is_in(candidate_ids))
            .order_by_asc(location::Column::Id)
            .all(db)
            .await?;

        let txn = db.begin().await?;
        let mut pairs = 0;
        for candidate in &candidates {
            let Some(point) = candidate.coordinates() else {
                report.skipped_without_coordinates += 1;
                continue;
            };
            let distance_km = haversine_km(origin_point, point);
            upsert_pair(&txn, location_id, candidate.id, distance_km, computed_at).await?;
            pairs += 1;
        }
        txn.commit().await?;

        debug!(
            "Refreshed {} pairs for location {} in company {}",
            pairs, location_id, company_id
        );
        report.pairs_upserted += pairs;
        report.companies.push(company_id);
    }

    info!(
        "Distance update for location {}: {} companies, {} pairs, {} skipped",
        location_id,
        report.companies.len(),
        report.pairs_upserted,
        report.skipped_without_coordinates
    );
    Ok(report)
}

/// Cached distance from one location to another, if it has been computed.
pub async fn distance_between<C>(
    db: &C,
    from_location_id: i64,
    to_location_id: i64,
) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    Ok(LocationDistance::find_by_id((from_location_id, to_location_id))
        .one(db)
        .await?
        .map(|row| row.distance_km))
}

/// Refreshes the matrix for every located point, in ID order.
///
/// Stops at the first failure; reports for locations already refreshed are lost with
/// the error, so the caller should simply run it again.
pub async fn refresh_all_distances(db: &DatabaseConnection) -> Result<Vec<DistanceUpdateReport>> {
    let located = Location::find()
        .filter(location::Column::Lat.is_not_null())
        .filter(location::Column::Lng.is_not_null())
        .order_by_asc(location::Column::Id)
        .all(db)
        .await?;

    let mut reports = Vec::with_capacity(located.len());
    for location in located {
        reports.push(update_location_distances(db, location.id).await?);
    }
    Ok(reports)
}
