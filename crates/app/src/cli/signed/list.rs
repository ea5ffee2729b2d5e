use clap::Args;
use taper_app::{
    database,
    domain::ledger::{LedgerService, PgLedgerService},
};

#[derive(Debug, Args)]
pub(crate) struct ListSignedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListSignedArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let documents = PgLedgerService::new(pool)
        .list_documents()
        .await
        .map_err(|error| format!("failed to list signed documents: {error}"))?;

    if documents.is_empty() {
        println!("no signed documents");
        return Ok(());
    }

    for document in documents {
        println!("uuid: {}", document.uuid);
        println!("otp_code: {}", document.otp_code);
        println!("label: {}", document.label);
        println!("filename: {}", document.filename);
        println!("stored_path: {}", document.stored_path);
        println!("created_at: {}", document.created_at);
        println!();
    }

    Ok(())
}
