/// Cron expression validation.
///
/// Expressions have exactly six fields: seconds, minutes, hours,
/// day-of-month, month, day-of-week. Field syntax (ranges, steps, lists,
/// names) is delegated to the `cron` crate, which numbers days of the week
/// 1-7 starting at Sunday. Fields match the host's local wall clock.
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};
use cron::Schedule;

use cronpilot_core::CronpilotError;

pub const FIELD_COUNT: usize = 6;

/// Parse a six-field expression.
pub fn parse_schedule(expr: &str) -> Result<Schedule, CronpilotError> {
    let invalid = |reason: String| CronpilotError::InvalidExpression {
        expression: expr.to_string(),
        reason,
    };

    let fields = expr.split_whitespace().count();
    if fields != FIELD_COUNT {
        // The `cron` crate also takes a trailing year field; that is rejected here.
        return Err(invalid(format!(
            "expected {} fields (sec min hour dom mon dow), got {}",
            FIELD_COUNT, fields
        )));
    }
    Schedule::from_str(expr.trim()).map_err(|e| invalid(e.to_string()))
}

/// Check an expression without keeping the parsed schedule.
pub fn validate_cron(expr: &str) -> Result<(), CronpilotError> {
    parse_schedule(expr).map(|_| ())
}

/// The first occurrence strictly after `after`, matched against local time.
pub fn next_after(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    next_after_in(schedule, after, &Local)
}

/// The first occurrence strictly after `after`, matched against `tz`.
pub fn next_after_in<Tz: TimeZone>(
    schedule: &Schedule,
    after: DateTime<Utc>,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    schedule
        .after(&after.with_timezone(tz))
        .next()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    #[test]
    fn accepts_six_field_expressions() {
        for expr in [
            "* * * * * *",
            "0 */5 * * * *",
            "30 0 2 * * *",
            "0 0 9-17 * * Mon-Fri",
            "0 15,45 * 1 Jan-Jun *",
        ] {
            assert!(validate_cron(expr).is_ok(), "{expr} should parse");
        }
    }

    #[test]
    fn rejects_wrong_field_count() {
        for expr in ["* * * * *", "0 0 0 1 1 * 2030", "", "*"] {
            let err = validate_cron(expr).unwrap_err();
            assert!(matches!(err, CronpilotError::InvalidExpression { .. }), "{expr}");
        }
    }

    #[test]
    fn rejects_bad_field_values() {
        assert!(validate_cron("61 * * * * *").is_err());
        assert!(validate_cron("* * 25 * * *").is_err());
        assert!(validate_cron("* * * * * fooday").is_err());
        let err = validate_cron("not a cron at all x").unwrap_err();
        assert!(err.to_string().contains("not a cron at all x"));
    }

    #[test]
    fn next_after_is_strictly_later() {
        let schedule = parse_schedule("0 */15 * * * *").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap();
        let next = next_after_in(&schedule, at, &Utc).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap());

        let every_second = parse_schedule("* * * * * *").unwrap();
        let next = next_after_in(&every_second, at, &Utc).unwrap();
        assert_eq!(next.second(), 1);
    }

    #[test]
    fn hours_follow_the_zone_wall_clock() {
        let schedule = parse_schedule("0 0 2 * * *").unwrap();
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();

        let next = next_after_in(&schedule, at, &shanghai).unwrap();
        assert_eq!(next.with_timezone(&shanghai).hour(), 2);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 17, 18, 0, 0).unwrap());
    }

    #[test]
    fn next_after_uses_local_time() {
        let schedule = parse_schedule("0 30 4 * * *").unwrap();
        let next = next_after(&schedule, Utc::now()).unwrap();
        let local = next.with_timezone(&Local);
        assert_eq!((local.hour(), local.minute(), local.second()), (4, 30, 0));
        assert!(next > Utc::now());
    }
}
