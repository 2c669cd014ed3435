//! Wizard configuration: defaults, build-time env and per-mount overrides.

use booking_core::BookingConfig;
use serde::Deserialize;

/// Fields a host page may override when mounting.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub treasury_address: Option<String>,
    #[serde(default)]
    pub native_decimals: Option<u32>,
    #[serde(default)]
    pub success_path: Option<String>,
}

/// Defaults, then `BOOKING_API_URL` / `BOOKING_TREASURY` at build time, then
/// the mount overrides.
pub fn resolve_config(overrides: ConfigOverrides) -> BookingConfig {
    let build_env = ConfigOverrides {
        api_base_url: option_env!("BOOKING_API_URL").map(str::to_string),
        treasury_address: option_env!("BOOKING_TREASURY").map(str::to_string),
        ..ConfigOverrides::default()
    };
    apply(apply(BookingConfig::default(), build_env), overrides)
}

fn apply(mut base: BookingConfig, overrides: ConfigOverrides) -> BookingConfig {
    if let Some(url) = non_empty(overrides.api_base_url) {
        base.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(address) = non_empty(overrides.treasury_address) {
        base.treasury_address = address;
    }
    if let Some(decimals) = overrides.native_decimals {
        base.native_decimals = decimals;
    }
    if let Some(path) = non_empty(overrides.success_path) {
        base.success_path = path;
    }
    base
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
