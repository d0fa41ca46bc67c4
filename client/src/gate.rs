//! Premium access gating for export

use crate::api::{ApiClient, ApiError};

#[derive(Debug, PartialEq)]
pub enum ExportDecision {
    /// Caller is premium; hand the request to the export pipeline.
    Proceed,
    /// Caller is free-tier; route to the upgrade prompt instead.
    Upgrade,
}

/// Decide at click-time whether export may run.
///
/// Always asks the API for the persisted flag. The session file's cached
/// copy is display-only - a forged or stale local value must not unlock
/// export.
pub fn authorize_export(api: &ApiClient) -> Result<ExportDecision, ApiError> {
    let me = api.me()?;

    Ok(if me.is_premium {
        ExportDecision::Proceed
    } else {
        ExportDecision::Upgrade
    })
}
