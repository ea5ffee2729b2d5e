//! Tracing subscriber initialisation.

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, settings};

/// Install structured logging and the request-level runtime settings.
pub(crate) fn init(config: &ServerConfig) -> Result<(), ObservabilityError> {
    settings::apply_runtime_config(&config.observability);
    logging::init_subscriber(&config.logging)
}
