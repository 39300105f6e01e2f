use dotenvy::dotenv;
use partstore::{
    config,
    core::{
        import::{self, ImportOutcome},
        ledger::Ledger,
        notifier::LogNotifier,
    },
    errors::{Error, Result},
    storage::Storage,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: partstore <import FILE [--apply] | stock PART_NUMBER | verify>";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();

    // 3. Load the ledger configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect storage and make sure the schema exists
    let storage = Storage::connect(&config::database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    storage
        .create_tables()
        .await
        .inspect(|_| info!("Database schema ready."))?;

    let ledger = Ledger::from_config(storage, &app_config, Arc::new(LogNotifier));

    // 5. Run the requested command
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["import", path, rest @ ..] => {
            let apply = rest.contains(&"--apply");
            let payload = std::fs::read(path)?;
            match import::import(&ledger, &payload, apply, Some("cli")).await? {
                ImportOutcome::Preview(preview) => {
                    info!(mapping = ?preview.mapping, rows = preview.rows.len(), "Dry run; pass --apply to write");
                    for row in &preview.rows {
                        println!("{row:?}");
                    }
                }
                ImportOutcome::Applied(report) => {
                    for result in report.results.iter().filter(|r| r.error.is_some()) {
                        println!("line {}: {}", result.line, result.error.as_deref().unwrap_or_default());
                    }
                    println!("{:?}", report.summary);
                }
            }
        }
        ["stock", part_number] => {
            let stock = ledger.stock_for_part(part_number).await?;
            println!(
                "{} ({}) total {} (min {})",
                stock.part.part_number, stock.part.description, stock.total, stock.part.min_qty
            );
            for location in &stock.locations {
                println!("  {:<20} {:<16} {}", location.location_name, location.barcode, location.qty);
            }
        }
        ["verify"] => {
            let checks = ledger.verify_all().await?;
            let broken: Vec<_> = checks.iter().filter(|c| !c.is_consistent()).collect();
            for check in &broken {
                error!(part_id = check.part_id, ?check, "Stock does not match transaction log");
            }
            info!(parts = checks.len(), inconsistent = broken.len(), "Verification finished");
        }
        _ => {
            return Err(Error::Config {
                message: USAGE.to_string(),
            });
        }
    }

    Ok(())
}
