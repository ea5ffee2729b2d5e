//! Signing Config

use std::path::PathBuf;

use clap::Args;

/// Default multipart ceiling for `/taper/sign`.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Signing pipeline settings.
#[derive(Debug, Args)]
pub struct SigningConfig {
    /// HMAC secret for signing tokens
    #[arg(long, env = "TAPER_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: String,

    /// Directory receiving archived signed PDFs
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Largest accepted `/taper/sign` request body, in bytes
    #[arg(long, env = "TAPER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Burn each OTP on its first stored signing
    #[arg(long, env = "TAPER_SINGLE_USE_OTP", default_value_t = false)]
    pub single_use_otp: bool,
}
