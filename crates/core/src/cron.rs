//! Cron expression utilities.
//!
//! Schedules accept standard 5-field Unix cron expressions
//! (minute, hour, day-of-month, month, day-of-week). The `cron` crate
//! wants a leading seconds field, so 5-field expressions are normalized
//! to fire at second 0.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

/// A cron expression that failed to parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cron expression '{expression}': {reason}")]
pub struct CronError {
    pub expression: String,
    pub reason: String,
}

/// Convert a 5-field Unix cron expression to the 6-field form.
fn normalize_cron_expr(cron_expr: &str) -> String {
    let fields: Vec<&str> = cron_expr.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        cron_expr.trim().to_string()
    }
}

/// Parse a cron expression into a schedule.
pub fn parse_cron(cron_expr: &str) -> Result<Schedule, CronError> {
    if cron_expr.trim().is_empty() {
        return Err(CronError {
            expression: cron_expr.to_string(),
            reason: "expression is empty".to_string(),
        });
    }

    let normalized = normalize_cron_expr(cron_expr);
    Schedule::from_str(&normalized).map_err(|e| CronError {
        expression: cron_expr.to_string(),
        reason: e.to_string(),
    })
}

/// Validate a cron expression without computing any fire time.
pub fn validate_cron(cron_expr: &str) -> Result<(), CronError> {
    parse_cron(cron_expr).map(|_| ())
}

/// Next fire time strictly after `after`.
pub fn next_fire_after(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

/// The next `count` fire times after now.
pub fn upcoming(schedule: &Schedule, count: usize) -> Vec<DateTime<Utc>> {
    schedule.upcoming(Utc).take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_cron_expr() {
        assert_eq!(normalize_cron_expr("* * * * *"), "0 * * * * *");
        assert_eq!(normalize_cron_expr("0 * * * *"), "0 0 * * * *");
        assert_eq!(normalize_cron_expr("0 0 * * * *"), "0 0 * * * *");
    }

    #[test]
    fn test_valid_cron_expression() {
        assert!(validate_cron("0 * * * *").is_ok());
        assert!(validate_cron("*/5 * * * *").is_ok());
        assert!(validate_cron("0 9 * * 1-5").is_ok());
    }

    #[test]
    fn test_invalid_cron_expression() {
        assert!(validate_cron("invalid").is_err());
        assert!(validate_cron("").is_err());
        assert!(validate_cron("   ").is_err());
        assert!(validate_cron("61 * * * *").is_err());
        assert!(validate_cron("0 0 0 0 0 0 0 0").is_err());
    }

    #[test]
    fn test_error_names_expression() {
        let err = validate_cron("nope").unwrap_err();
        assert_eq!(err.expression, "nope");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_next_fire_after() {
        let schedule = parse_cron("30 * * * *").unwrap();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

        let next = next_fire_after(&schedule, base).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap());

        let after_next = next_fire_after(&schedule, next).unwrap();
        assert_eq!(after_next, Utc.with_ymd_and_hms(2024, 1, 1, 11, 30, 0).unwrap());
    }

    #[test]
    fn test_upcoming_is_in_the_future() {
        let schedule = parse_cron("* * * * *").unwrap();
        let times = upcoming(&schedule, 3);
        assert_eq!(times.len(), 3);
        assert!(times[0] > Utc::now());
        assert!(times[0] < times[1] && times[1] < times[2]);
    }
}
