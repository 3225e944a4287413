use serde::{Deserialize, Serialize};

/// Configuration for the scheduling module.
///
/// These values feed the config-backed provider/course configuration ports;
/// deployments with per-provider or per-course settings substitute their own
/// port implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Slot length used when a recurrence pattern does not specify one.
    #[serde(default = "default_slot_duration_minutes")]
    pub default_slot_duration_minutes: i32,
    /// Bookings must start at least this far in the future.
    #[serde(default = "default_minimum_lead_minutes")]
    pub minimum_lead_minutes: i64,
    /// Monthly bookings allowed per student per course. 0 refuses all bookings.
    #[serde(default = "default_monthly_allowance")]
    pub default_monthly_allowance: i32,
    /// Book straight to `confirmed` instead of `pending`.
    #[serde(default = "default_auto_confirm")]
    pub auto_confirm: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_slot_duration_minutes: default_slot_duration_minutes(),
            minimum_lead_minutes: default_minimum_lead_minutes(),
            default_monthly_allowance: default_monthly_allowance(),
            auto_confirm: default_auto_confirm(),
        }
    }
}

fn default_slot_duration_minutes() -> i32 {
    30
}

fn default_minimum_lead_minutes() -> i64 {
    60
}

fn default_monthly_allowance() -> i32 {
    4
}

fn default_auto_confirm() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SchedulingConfig::default();
        assert_eq!(cfg.default_slot_duration_minutes, 30);
        assert_eq!(cfg.minimum_lead_minutes, 60);
        assert_eq!(cfg.default_monthly_allowance, 4);
        assert!(cfg.auto_confirm);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"minimum_lead_minutes": 0, "auto_confirm": false}"#;
        let cfg: SchedulingConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(cfg.minimum_lead_minutes, 0);
        assert!(!cfg.auto_confirm);
        assert_eq!(cfg.default_slot_duration_minutes, 30);
        assert_eq!(cfg.default_monthly_allowance, 4);
    }
}
