use serde::Serialize;

use crate::models::ItemKind;

/// Quest and treasure attempts must differ by at least this much before one
/// activity counts as preferred.
pub const PREFERENCE_MARGIN: u32 = 2;

/// Attempts needed before the analytics card shows a classification.
pub const MIN_ATTEMPTS_FOR_INSIGHT: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub quest_attempts: u32,
    pub quest_successes: u32,
    pub treasure_attempts: u32,
    pub boss_attempts: u32,
    pub boss_successes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredActivity {
    Quests,
    Flashcards,
    Balanced,
}

impl PreferredActivity {
    pub fn label(&self) -> &'static str {
        match self {
            PreferredActivity::Quests => "Quests & Challenges",
            PreferredActivity::Flashcards => "Flashcards & Review",
            PreferredActivity::Balanced => "A balanced mix",
        }
    }
}

impl UserAnalytics {
    /// Counts one attempt of `kind`. Treasures have no success counter.
    pub fn record(self, kind: ItemKind, success: bool) -> UserAnalytics {
        let mut next = self;
        match kind {
            ItemKind::Quest => {
                next.quest_attempts += 1;
                if success {
                    next.quest_successes += 1;
                }
            }
            ItemKind::Treasure => next.treasure_attempts += 1,
            ItemKind::BossQuestion => {
                next.boss_attempts += 1;
                if success {
                    next.boss_successes += 1;
                }
            }
        }
        next
    }

    /// `None` until at least one quest was attempted.
    pub fn quest_accuracy(&self) -> Option<f64> {
        ratio(self.quest_successes, self.quest_attempts)
    }

    pub fn boss_accuracy(&self) -> Option<f64> {
        ratio(self.boss_successes, self.boss_attempts)
    }

    pub fn total_attempts(&self) -> u32 {
        self.quest_attempts + self.treasure_attempts + self.boss_attempts
    }

    pub fn has_enough_data(&self) -> bool {
        self.total_attempts() >= MIN_ATTEMPTS_FOR_INSIGHT
    }

    pub fn preferred_activity(&self) -> PreferredActivity {
        if self.quest_attempts >= self.treasure_attempts + PREFERENCE_MARGIN {
            PreferredActivity::Quests
        } else if self.treasure_attempts >= self.quest_attempts + PREFERENCE_MARGIN {
            PreferredActivity::Flashcards
        } else {
            PreferredActivity::Balanced
        }
    }

    pub fn summary(&self) -> AnalyticsSummary {
        AnalyticsSummary {
            counts: *self,
            quest_accuracy: self.quest_accuracy(),
            boss_accuracy: self.boss_accuracy(),
            preferred_activity: self
                .has_enough_data()
                .then(|| self.preferred_activity()),
        }
    }
}

fn ratio(successes: u32, attempts: u32) -> Option<f64> {
    (attempts > 0).then(|| f64::from(successes) / f64::from(attempts) * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(flatten)]
    pub counts: UserAnalytics,
    pub quest_accuracy: Option<f64>,
    pub boss_accuracy: Option<f64>,
    pub preferred_activity: Option<PreferredActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_by_kind() {
        let analytics = UserAnalytics::default()
            .record(ItemKind::Quest, true)
            .record(ItemKind::Quest, false)
            .record(ItemKind::Treasure, true)
            .record(ItemKind::Treasure, false)
            .record(ItemKind::BossQuestion, true);

        assert_eq!(analytics.quest_attempts, 2);
        assert_eq!(analytics.quest_successes, 1);
        assert_eq!(analytics.treasure_attempts, 2);
        assert_eq!(analytics.boss_attempts, 1);
        assert_eq!(analytics.boss_successes, 1);
    }

    #[test]
    fn test_accuracy_without_attempts_is_undefined() {
        let analytics = UserAnalytics::default();
        assert_eq!(analytics.quest_accuracy(), None);
        assert_eq!(analytics.boss_accuracy(), None);

        let analytics = analytics.record(ItemKind::Quest, true).record(ItemKind::Quest, false);
        assert_eq!(analytics.quest_accuracy(), Some(50.0));
    }

    #[test]
    fn test_preferred_activity_uses_margin() {
        let mut analytics = UserAnalytics {
            quest_attempts: 3,
            treasure_attempts: 2,
            ..Default::default()
        };
        assert_eq!(analytics.preferred_activity(), PreferredActivity::Balanced);

        analytics.quest_attempts = 4;
        assert_eq!(analytics.preferred_activity(), PreferredActivity::Quests);

        analytics.treasure_attempts = 6;
        assert_eq!(analytics.preferred_activity(), PreferredActivity::Flashcards);
    }

    #[test]
    fn test_summary_hides_preference_until_enough_data() {
        let analytics = UserAnalytics::default()
            .record(ItemKind::Quest, true)
            .record(ItemKind::Quest, true);
        assert_eq!(analytics.summary().preferred_activity, None);

        let analytics = analytics.record(ItemKind::Quest, false);
        assert_eq!(
            analytics.summary().preferred_activity,
            Some(PreferredActivity::Quests)
        );
    }
}
