use chrono::{DateTime, Utc};

use crate::models::submissions::entities::Lateness;

/// 计算提交相对截止时间的迟交情况
///
/// 恰好在截止时刻提交不算迟交；迟交分钟数向下取整。
pub fn compute_lateness(deadline: DateTime<Utc>, submitted_at: DateTime<Utc>) -> Lateness {
    if submitted_at <= deadline {
        return Lateness::ON_TIME;
    }
    Lateness {
        is_late: true,
        late_by_minutes: Some((submitted_at - deadline).num_minutes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn test_exact_deadline_is_on_time() {
        assert_eq!(compute_lateness(deadline(), deadline()), Lateness::ON_TIME);
        assert_eq!(
            compute_lateness(deadline(), deadline() - Duration::hours(3)),
            Lateness::ON_TIME
        );
    }

    #[test]
    fn test_minutes_are_floored() {
        let late = compute_lateness(deadline(), deadline() + Duration::seconds(5 * 60 + 59));
        assert!(late.is_late);
        assert_eq!(late.late_by_minutes, Some(5));

        let days = compute_lateness(deadline(), deadline() + Duration::days(2));
        assert_eq!(days.late_by_minutes, Some(2 * 24 * 60));
    }

    #[test]
    fn test_under_a_minute_is_late_with_zero_minutes() {
        let late = compute_lateness(deadline(), deadline() + Duration::seconds(30));
        assert!(late.is_late);
        assert_eq!(late.late_by_minutes, Some(0));
    }
}
