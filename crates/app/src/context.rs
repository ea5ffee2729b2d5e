//! App Context

use std::{fmt, path::PathBuf, sync::Arc};

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    clock::{Clock, SystemClock},
    database,
    domain::{
        ledger::{InMemoryLedgerService, LedgerService, PgLedgerService},
        otps::{InMemoryOtpsService, OtpsService, PgOtpsService},
        signing::{SigningService, TaperSigningService},
        tokens::{SigningTokenSecret, SigningTokens},
    },
    storage::{DocumentStorage, FilesystemDocumentStorage},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

/// Settings for the signing pipeline.
#[derive(Debug)]
pub struct SigningSettings {
    pub token_secret: SigningTokenSecret,
    /// Root directory for archived signed PDFs.
    pub upload_dir: PathBuf,
    pub single_use_otp: bool,
}

#[derive(Clone)]
pub struct AppContext {
    pub otps: Arc<dyn OtpsService>,
    pub ledger: Arc<dyn LedgerService>,
    pub storage: Arc<dyn DocumentStorage>,
    pub signing: Arc<dyn SigningService>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Build application context backed by `PostgreSQL`, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting to or migrating the database fails.
    pub async fn from_database_url(
        url: &str,
        settings: SigningSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        info!("connected to postgres registry");

        Ok(Self::from_parts(
            Arc::new(PgOtpsService::new(pool.clone())),
            Arc::new(PgLedgerService::new(pool)),
            settings,
            Arc::new(SystemClock),
        ))
    }

    /// Build application context with process-local registries. Nothing survives a restart
    /// except the archived files.
    #[must_use]
    pub fn in_memory(settings: SigningSettings) -> Self {
        Self::from_parts(
            Arc::new(InMemoryOtpsService::new()),
            Arc::new(InMemoryLedgerService::new()),
            settings,
            Arc::new(SystemClock),
        )
    }

    #[must_use]
    pub fn from_parts(
        otps: Arc<dyn OtpsService>,
        ledger: Arc<dyn LedgerService>,
        settings: SigningSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let storage: Arc<dyn DocumentStorage> =
            Arc::new(FilesystemDocumentStorage::new(settings.upload_dir));

        let signing = TaperSigningService::new(
            otps.clone(),
            ledger.clone(),
            storage.clone(),
            SigningTokens::new(settings.token_secret),
        )
        .with_single_use_otp(settings.single_use_otp);

        Self {
            otps,
            ledger,
            storage,
            signing: Arc::new(signing),
            clock,
        }
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
