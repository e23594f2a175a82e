//! Process configuration, read from environment variables at startup.

use std::time::Duration;

use chrono::{FixedOffset, NaiveTime};
use thiserror::Error;

use chatorder_customers::DeliveryWindowPolicy;

/// Shared secret used when `API_SECRET` is unset. Never use it outside dev.
pub const DEV_API_SECRET: &str = "secreto-123";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub port: u16,
    pub api_secret: String,
    /// True when `api_secret` is the built-in dev default.
    pub api_secret_is_default: bool,
    /// Default data-API base URL; requests may name their own.
    pub data_api_url: Option<String>,
    pub data_api_timeout: Duration,
    /// Local time zone of the order-taking window.
    pub tz_offset: FixedOffset,
    pub window: DeliveryWindowPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", e.to_string()))?,
            None => 3000,
        };

        let (api_secret, api_secret_is_default) = match get("API_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_API_SECRET.to_string(), true),
        };

        let tz_offset = match get("ORDER_TZ_OFFSET") {
            Some(raw) => parse_offset(&raw).ok_or_else(|| {
                ConfigError::invalid("ORDER_TZ_OFFSET", format!("expected ±HH:MM, got '{raw}'"))
            })?,
            None => FixedOffset::west_opt(3 * 3600)
                .ok_or_else(|| ConfigError::invalid("ORDER_TZ_OFFSET", "default offset out of range"))?,
        };

        let defaults = DeliveryWindowPolicy::default();
        let opens_at = parse_time_var(&get, "ORDER_WINDOW_OPENS")?.unwrap_or(defaults.opens_at());
        let closes_at = parse_time_var(&get, "ORDER_WINDOW_CLOSES")?.unwrap_or(defaults.closes_at());
        let lookahead_days = match get("ORDER_LOOKAHEAD_DAYS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| ConfigError::invalid("ORDER_LOOKAHEAD_DAYS", e.to_string()))?,
            None => defaults.lookahead_days(),
        };
        let window = DeliveryWindowPolicy::new(opens_at, closes_at, lookahead_days)
            .map_err(|e| ConfigError::invalid("ORDER_WINDOW_OPENS", e.to_string()))?;

        let data_api_timeout = match get("DATA_API_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|e| ConfigError::invalid("DATA_API_TIMEOUT_SECS", e.to_string()))?,
            ),
            None => Duration::from_secs(10),
        };

        Ok(Self {
            bind_host: get("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_secret,
            api_secret_is_default,
            data_api_url: get("DATA_API_URL"),
            data_api_timeout,
            tz_offset,
            window,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn parse_time_var<G>(get: &G, var: &'static str) -> Result<Option<NaiveTime>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|raw| {
            NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|_| ConfigError::invalid(var, format!("expected HH:MM, got '{raw}'")))
        })
        .transpose()
}

/// `-03:00`, `+05:30`, `Z`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
