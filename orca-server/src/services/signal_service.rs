use orca_api::{AlarmType, ReadingStatus};

use crate::models::SensorConfig;
use crate::models::sensor_config::DATA_TYPE_LOOP;

/// Width of the warning band next to each alarm threshold, as a fraction
/// of the threshold's absolute value.
const WARNING_BUFFER: f64 = 0.10;

/// Loop-current bounds for 4-20 mA instruments.
const LOOP_MIN_MA: f64 = 4.0;
const LOOP_MAX_MA: f64 = 20.0;

/// Hard threshold breach, reported separately from the status tier so the
/// notification path can react to critical readings only.
#[derive(Debug, Clone)]
pub struct AlarmBreach {
    pub alarm_type: AlarmType,
    pub message: String,
}

/// Map a raw instrument value to its engineering-unit value. Without a
/// config, or for `"real"` sensors, the value passes through unchanged.
/// Out-of-range loop currents are clamped before scaling so a wiring
/// glitch is not recorded as an extreme reading.
pub fn convert(raw: f64, config: Option<&SensorConfig>) -> f64 {
    match config {
        Some(config) if config.data_type == DATA_TYPE_LOOP => {
            let raw = raw.clamp(LOOP_MIN_MA, LOOP_MAX_MA);
            config.zero_value + ((raw - LOOP_MIN_MA) / (LOOP_MAX_MA - LOOP_MIN_MA)) * config.span_value
        }
        _ => raw,
    }
}

/// Classify a converted value against the config's thresholds. Critical
/// is checked first and strictly dominates the warning tier.
pub fn classify(value: f64, config: Option<&SensorConfig>, warning_zone: bool) -> ReadingStatus {
    let Some(config) = config else {
        return ReadingStatus::Normal;
    };
    if !config.alarm_enabled {
        return ReadingStatus::Normal;
    }

    if let Some(min_alarm) = config.min_alarm {
        if value < min_alarm {
            return ReadingStatus::Critical;
        }
    }
    if let Some(max_alarm) = config.max_alarm {
        if value > max_alarm {
            return ReadingStatus::Critical;
        }
    }

    if warning_zone {
        if let Some(min_alarm) = config.min_alarm {
            let warning_min = min_alarm + min_alarm.abs() * WARNING_BUFFER;
            if value < warning_min {
                return ReadingStatus::Warning;
            }
        }
        if let Some(max_alarm) = config.max_alarm {
            let warning_max = max_alarm - max_alarm.abs() * WARNING_BUFFER;
            if value > warning_max {
                return ReadingStatus::Warning;
            }
        }
    }

    ReadingStatus::Normal
}

/// Report only hard threshold breaches, with the crossed side and a
/// human-readable message for the notification mail.
pub fn check_alarm(value: f64, config: Option<&SensorConfig>) -> Option<AlarmBreach> {
    let config = config?;
    if !config.alarm_enabled {
        return None;
    }

    if let Some(min_alarm) = config.min_alarm {
        if value < min_alarm {
            return Some(AlarmBreach {
                alarm_type: AlarmType::Low,
                message: format!("Value {value} below minimum {min_alarm}"),
            });
        }
    }

    if let Some(max_alarm) = config.max_alarm {
        if value > max_alarm {
            return Some(AlarmBreach {
                alarm_type: AlarmType::High,
                message: format!("Value {value} above maximum {max_alarm}"),
            });
        }
    }

    None
}

/// Round to a channel's configured display precision.
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
