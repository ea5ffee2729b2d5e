use clap::Args;
use jiff::Timestamp;
use taper_app::{
    database,
    domain::otps::{OtpsService, PgOtpsService},
};

#[derive(Debug, Args)]
pub(crate) struct CreateOtpArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Free-text label recorded against documents signed with this OTP
    #[arg(long, default_value = "")]
    label: String,

    /// Public base URL used to print the signing link
    #[arg(long, env = "PUBLIC_BASE_URL")]
    public_base_url: Option<String>,
}

pub(crate) async fn run(args: CreateOtpArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let otp = PgOtpsService::new(pool)
        .create_otp(&args.label, Timestamp::now())
        .await
        .map_err(|error| format!("failed to create otp: {error}"))?;

    println!("otp: {}", otp.code);
    println!("label: {}", otp.label);
    println!("expires_at: {}", otp.expires_at);

    if let Some(base) = args.public_base_url {
        println!("url: {}/taper", base.trim_end_matches('/'));
    }

    Ok(())
}
