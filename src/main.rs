use rental_ledger::{
    config::{database, settings::Settings},
    entities::{Lease, Payment, PaymentAudit, Property},
    errors::Result,
};
use dotenvy::dotenv;
use sea_orm::{EntityTrait, PaginatorTrait};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load settings (file, then environment overrides)
    let settings = Settings::load_default()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!(upload_dir = %settings.upload_dir.display(), "Loaded settings");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Report what the ledger currently holds
    let properties = Property::find().count(&db).await?;
    let leases = Lease::find().count(&db).await?;
    let payments = Payment::find().count(&db).await?;
    let audit_rows = PaymentAudit::find().count(&db).await?;
    info!(properties, leases, payments, audit_rows, "Rental ledger ready");

    Ok(())
}
