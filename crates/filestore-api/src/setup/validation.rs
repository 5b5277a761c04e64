//! Configuration validation
//!
//! Validates configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use filestore_core::{Config, OperationKind};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let limits = config.limits();
    for kind in OperationKind::ALL {
        if limits.for_kind(kind) == 0 {
            tracing::warn!(
                operation = %kind,
                "Concurrency limit is 0 - every {} request will be rejected",
                kind
            );
        }
    }

    if config.is_production() && config.log_format() != "json" {
        tracing::warn!("Running in production with text logs - consider LOG_FORMAT=json");
    }

    Ok(())
}
