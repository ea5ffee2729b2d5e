use clap::Args;
use jiff::Timestamp;
use taper_app::{
    database,
    domain::otps::{OtpsService, PgOtpsService},
};

#[derive(Debug, Args)]
pub(crate) struct PurgeOtpsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: PurgeOtpsArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let removed = PgOtpsService::new(pool)
        .purge_expired(Timestamp::now())
        .await
        .map_err(|error| format!("failed to purge otps: {error}"))?;

    println!("purged: {removed}");

    Ok(())
}
