//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use taper_app::domain::tokens::SigningGrant;

const SIGNING_GRANT_DEPOT_KEY: &str = "signing_grant";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_signing_grant(&mut self, grant: SigningGrant);

    fn signing_grant_or_401(&self) -> Result<&SigningGrant, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_signing_grant(&mut self, grant: SigningGrant) {
        self.insert(SIGNING_GRANT_DEPOT_KEY, grant);
    }

    fn signing_grant_or_401(&self) -> Result<&SigningGrant, StatusError> {
        self.get::<SigningGrant>(SIGNING_GRANT_DEPOT_KEY)
            .map_err(|_ignored| StatusError::unauthorized().brief(crate::auth::INVALID_TOKEN_BRIEF))
    }
}
