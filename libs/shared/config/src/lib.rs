use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub slot_granularity_minutes: i64,
    pub default_duration_minutes: i32,
    pub cancel_lead_hours: i64,
    pub reschedule_lead_hours: i64,
    pub sweep_interval_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000),
            slot_granularity_minutes: parse_var("SLOT_GRANULARITY_MINUTES", 30),
            default_duration_minutes: parse_var("DEFAULT_DURATION_MINUTES", 30),
            cancel_lead_hours: parse_var("CANCEL_LEAD_HOURS", 2),
            reschedule_lead_hours: parse_var("RESCHEDULE_LEAD_HOURS", 4),
            sweep_interval_seconds: parse_var("SWEEP_INTERVAL_SECONDS", 60),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            slot_granularity_minutes: 30,
            default_duration_minutes: 30,
            cancel_lead_hours: 2,
            reschedule_lead_hours: 4,
            sweep_interval_seconds: 60,
        }
    }
}

fn parse_var<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value, using default {}", name, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_scheduling_rules() {
        let config = AppConfig::default();
        assert_eq!(config.slot_granularity_minutes, 30);
        assert_eq!(config.cancel_lead_hours, 2);
        assert_eq!(config.reschedule_lead_hours, 4);
    }
}
