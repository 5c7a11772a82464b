use chrono::{Duration, NaiveDate};

/// Review interval in days, indexed by mastery level.
pub const SRS_INTERVALS: [i64; 7] = [1, 2, 7, 14, 30, 90, 180];

/// Highest reachable mastery level.
pub const MAX_MASTERY_LEVEL: u8 = (SRS_INTERVALS.len() - 1) as u8;

/// Moves an item one mastery level up on success and one down on failure,
/// clamped to `0..=MAX_MASTERY_LEVEL`, and returns the new level together with
/// the date it becomes due again.
///
/// Both boundaries are absorbing: failing at level 0 stays at 0 with the
/// shortest interval, succeeding at the top stays at the top with the longest.
pub fn schedule(current_level: u8, success: bool, today: NaiveDate) -> (u8, NaiveDate) {
    let current = current_level.min(MAX_MASTERY_LEVEL);
    let new_level = if success {
        (current + 1).min(MAX_MASTERY_LEVEL)
    } else {
        current.saturating_sub(1)
    };

    (new_level, next_review_date(new_level, today))
}

pub fn next_review_date(level: u8, today: NaiveDate) -> NaiveDate {
    let days = SRS_INTERVALS[usize::from(level.min(MAX_MASTERY_LEVEL))];
    today + Duration::days(days)
}

/// An item is due once its review date is today or earlier.
pub fn is_due(next_review_date: NaiveDate, today: NaiveDate) -> bool {
    next_review_date <= today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_level_stays_in_bounds() {
        let today = date(2024, 1, 10);
        for level in 0..=MAX_MASTERY_LEVEL {
            for success in [true, false] {
                let (new_level, _) = schedule(level, success, today);
                assert!(new_level <= MAX_MASTERY_LEVEL);
            }
        }
    }

    #[test]
    fn test_success_and_failure_step_by_one() {
        let today = date(2024, 1, 10);
        for level in 0..MAX_MASTERY_LEVEL {
            assert_eq!(schedule(level, true, today).0, level + 1);
        }
        for level in 1..=MAX_MASTERY_LEVEL {
            assert_eq!(schedule(level, false, today).0, level - 1);
        }
    }

    #[test]
    fn test_boundaries_are_absorbing() {
        let today = date(2024, 1, 10);

        let (level, due) = schedule(0, false, today);
        assert_eq!(level, 0);
        assert_eq!(due, date(2024, 1, 11));

        let (level, due) = schedule(MAX_MASTERY_LEVEL, true, today);
        assert_eq!(level, MAX_MASTERY_LEVEL);
        assert_eq!(due, today + Duration::days(180));
    }

    #[test]
    fn test_correct_answer_at_level_two() {
        let today = date(2024, 1, 10);
        let (level, due) = schedule(2, true, today);
        assert_eq!(level, 3);
        assert_eq!(due, date(2024, 1, 24));
    }

    #[test]
    fn test_out_of_range_level_is_clamped() {
        let today = date(2024, 1, 10);
        assert_eq!(schedule(40, false, today).0, MAX_MASTERY_LEVEL - 1);
        assert_eq!(schedule(40, true, today).0, MAX_MASTERY_LEVEL);
    }

    #[test]
    fn test_is_due_uses_whole_days() {
        let today = date(2024, 1, 10);
        assert!(is_due(today, today));
        assert!(is_due(date(2024, 1, 9), today));
        assert!(!is_due(date(2024, 1, 11), today));
    }
}
