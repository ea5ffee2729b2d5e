//! Admin Config

use clap::Args;

/// Admin surface settings.
#[derive(Debug, Args)]
pub struct AdminConfig {
    /// Shared key for `/admin` routes; the admin surface answers 503 when unset
    #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
    pub admin_api_key: Option<String>,
}
