//! Background job entry point.
//!
//! Usage:
//!   sanitation-logistics distances [LOCATION_ID]
//!   sanitation-logistics availability COMPANY_ID START_DATE END_DATE
//!
//! Retry and scheduling belong to whatever runs this binary.

use sanitation_logistics::{
    config::{database, settings},
    core::{distance, summary::AvailabilitySummary},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn parse_id(raw: &str, what: &str) -> Result<i64> {
    raw.parse().map_err(|e| Error::Config {
        message: format!("Invalid {what} '{raw}': {e}"),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load engine settings
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    let blocking_statuses = settings.availability.blocking_statuses()?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Run the requested job
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["distances"] | [] => {
            let reports = distance::refresh_all_distances(&db).await?;
            let pairs: usize = reports.iter().map(|r| r.pairs_upserted).sum();
            info!(
                "Rebuilt distance matrix from {} locations ({} pair writes)",
                reports.len(),
                pairs
            );
        }
        ["distances", location_id] => {
            let report =
                distance::update_location_distances(&db, parse_id(location_id, "location id")?)
                    .await?;
            info!("{:?}", report);
        }
        ["availability", company_id, start, end] => {
            let summary = AvailabilitySummary::new(parse_id(company_id, "company id")?, start, end)
                .with_statuses(&blocking_statuses);
            if let Err(e) = summary.window() {
                warn!("Refusing to summarise: {}", e);
                return Err(e);
            }
            for row in summary.summary(&db).await? {
                info!("{}: {} available", row.unit_type.name, row.available);
            }
        }
        other => {
            return Err(Error::Config {
                message: format!("Unrecognised arguments: {other:?}"),
            });
        }
    }

    Ok(())
}
