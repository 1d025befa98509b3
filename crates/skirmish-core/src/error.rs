//! Configuration-time errors.
//!
//! These are the only errors the kernel surfaces as values. Everything that
//! goes wrong inside a tick recovers locally instead.

use thiserror::Error;

use crate::types::WeaponId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weapon \"{0}\" does not declare gun or turret mount support")]
    MissingMountType(String),

    #[error("unknown weapon id {0:?}")]
    UnknownWeapon(WeaponId),

    #[error("unknown weapon \"{0}\"")]
    UnknownWeaponName(String),

    #[error("weapon \"{weapon}\": {reason}")]
    InvalidStat { weapon: String, reason: String },

    #[error("setting \"{setting}\": {reason}")]
    InvalidSetting { setting: String, reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
