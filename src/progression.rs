use std::time::{Duration, Instant};

use serde::Serialize;

pub const XP_PER_SUCCESS: u32 = 15;
pub const XP_PER_FAILURE: u32 = 5;
/// Reserved for granting on a won boss battle; nothing awards it yet.
#[allow(unused)]
pub const BOSS_VICTORY_BONUS: u32 = 75;

/// How long a level-up banner stays visible.
pub const LEVEL_UP_VISIBLE_FOR: Duration = Duration::from_secs(3);

/// XP needed to leave `level`. Strictly increasing for `level >= 1`.
pub fn xp_to_next_level(level: u32) -> u32 {
    50 * level * level + 50 * level
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next_level: xp_to_next_level(1),
        }
    }
}

impl PlayerState {
    /// Adds XP, rolling any overflow into as many level-ups as it pays for.
    /// Returns the new state and whether at least one level was gained.
    pub fn add_xp(self, amount: u32) -> (PlayerState, bool) {
        let mut level = self.level;
        let mut xp = self.xp + amount;
        let mut threshold = self.xp_to_next_level;
        let mut leveled_up = false;

        while xp >= threshold {
            xp -= threshold;
            level += 1;
            threshold = xp_to_next_level(level);
            leveled_up = true;
        }

        (
            PlayerState {
                level,
                xp,
                xp_to_next_level: threshold,
            },
            leveled_up,
        )
    }
}

/// A level-up banner that hides itself once its deadline passes. A newer
/// notice replaces the old one outright, so an earlier deadline can never
/// clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpNotice {
    pub level: u32,
    pub expires_at: Instant,
}

impl LevelUpNotice {
    pub fn new(level: u32, now: Instant) -> Self {
        Self {
            level,
            expires_at: now + LEVEL_UP_VISIBLE_FOR,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn message(&self) -> String {
        format!("Level Up! You are now Level {}!", self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_strictly_increasing() {
        for level in 1..200 {
            assert!(xp_to_next_level(level + 1) > xp_to_next_level(level));
        }
        assert_eq!(xp_to_next_level(1), 100);
        assert_eq!(xp_to_next_level(2), 300);
    }

    #[test]
    fn test_five_correct_answers_stay_at_level_one() {
        let mut state = PlayerState::default();
        for _ in 0..5 {
            let (next, leveled) = state.add_xp(XP_PER_SUCCESS);
            assert!(!leveled);
            state = next;
        }
        assert_eq!(state.level, 1);
        assert_eq!(state.xp, 75);
    }

    #[test]
    fn test_overflow_rolls_into_next_level() {
        let (state, leveled) = PlayerState::default().add_xp(110);
        assert!(leveled);
        assert_eq!(state.level, 2);
        assert_eq!(state.xp, 10);
        assert_eq!(state.xp_to_next_level, 300);
    }

    #[test]
    fn test_large_gain_levels_up_multiple_times() {
        // 100 + 300 + 600 = 1000 clears levels 1..=3
        let (state, leveled) = PlayerState::default().add_xp(1005);
        assert!(leveled);
        assert_eq!(state.level, 4);
        assert_eq!(state.xp, 5);
        assert!(state.xp < state.xp_to_next_level);
    }

    #[test]
    fn test_add_xp_decomposes() {
        let amounts = [(0, 0), (15, 85), (99, 1), (250, 777), (1, 4000)];
        for (a, b) in amounts {
            let (split, _) = PlayerState::default().add_xp(a).0.add_xp(b);
            let (whole, _) = PlayerState::default().add_xp(a + b);
            assert_eq!(split, whole, "a={} b={}", a, b);
        }
    }

    #[test]
    fn test_notice_expires_after_window() {
        let now = Instant::now();
        let notice = LevelUpNotice::new(3, now);
        assert!(!notice.is_expired(now));
        assert!(!notice.is_expired(now + Duration::from_millis(2999)));
        assert!(notice.is_expired(now + LEVEL_UP_VISIBLE_FOR));
        assert_eq!(notice.message(), "Level Up! You are now Level 3!");
    }
}
