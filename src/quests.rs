use serde::Serialize;

use crate::data::{QuestTemplate, DAILY_QUEST_CATALOG};
use crate::models::ItemKind;

/// Number of catalog entries active at once.
pub const DAILY_QUEST_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Review,
    MasterQuest,
    MasterTreasure,
    AttemptBoss,
}

/// Something that happened in the session that daily quests may count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestEvent {
    Reviewed { kind: ItemKind, success: bool },
    BossAttempt,
}

impl QuestType {
    fn counts(&self, event: QuestEvent) -> bool {
        match (self, event) {
            (QuestType::Review, QuestEvent::Reviewed { .. }) => true,
            (
                QuestType::MasterQuest,
                QuestEvent::Reviewed {
                    kind: ItemKind::Quest,
                    success: true,
                },
            ) => true,
            (
                QuestType::MasterTreasure,
                QuestEvent::Reviewed {
                    kind: ItemKind::Treasure,
                    ..
                },
            ) => true,
            (QuestType::AttemptBoss, QuestEvent::BossAttempt) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuest {
    pub id: String,
    pub description: String,
    pub target: u32,
    pub progress: u32,
    pub completed: bool,
    pub reward: u32,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
}

impl DailyQuest {
    fn from_template(template: &QuestTemplate) -> Self {
        Self {
            id: template.id.to_string(),
            description: template.description.to_string(),
            target: template.target,
            progress: 0,
            completed: false,
            reward: template.reward,
            quest_type: template.quest_type,
        }
    }

    /// Counts `event` if it applies. Returns the reward on the single step that
    /// completes the quest; completed quests never move again.
    pub fn advance(&mut self, event: QuestEvent) -> Option<u32> {
        if self.completed || !self.quest_type.counts(event) {
            return None;
        }

        self.progress = (self.progress + 1).min(self.target);
        if self.progress >= self.target {
            self.completed = true;
            return Some(self.reward);
        }
        None
    }
}

/// Fresh quests for a newly current world.
pub fn draw_daily_quests() -> Vec<DailyQuest> {
    DAILY_QUEST_CATALOG
        .iter()
        .take(DAILY_QUEST_COUNT)
        .map(DailyQuest::from_template)
        .collect()
}

/// Quests that completed on this event, with their rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub id: String,
    pub description: String,
    pub reward: u32,
}

pub fn advance(quests: &mut [DailyQuest], event: QuestEvent) -> Vec<QuestCompletion> {
    quests
        .iter_mut()
        .filter_map(|quest| {
            quest.advance(event).map(|reward| QuestCompletion {
                id: quest.id.clone(),
                description: quest.description.clone(),
                reward,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quest(quest_type: QuestType, target: u32, progress: u32) -> DailyQuest {
        DailyQuest {
            id: "q".into(),
            description: "quest".into(),
            target,
            progress,
            completed: false,
            reward: 40,
            quest_type,
        }
    }

    fn reviewed(kind: ItemKind, success: bool) -> QuestEvent {
        QuestEvent::Reviewed { kind, success }
    }

    #[test]
    fn test_draw_takes_catalog_prefix() {
        let quests = draw_daily_quests();
        assert_eq!(quests.len(), DAILY_QUEST_COUNT);
        for (quest, template) in quests.iter().zip(DAILY_QUEST_CATALOG) {
            assert_eq!(quest.id, template.id);
            assert_eq!(quest.progress, 0);
            assert!(!quest.completed);
            assert!(quest.target > 0);
        }
    }

    #[test]
    fn test_review_completion_fires_once() {
        let mut quests = vec![quest(QuestType::Review, 3, 2)];

        let done = advance(&mut quests, reviewed(ItemKind::Quest, false));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].reward, 40);
        assert_eq!(quests[0].progress, 3);
        assert!(quests[0].completed);

        let done = advance(&mut quests, reviewed(ItemKind::Treasure, true));
        assert!(done.is_empty());
        assert_eq!(quests[0].progress, 3);
        assert!(quests[0].completed);
    }

    #[test]
    fn test_master_quest_needs_successful_quest() {
        let mut q = quest(QuestType::MasterQuest, 5, 0);
        q.advance(reviewed(ItemKind::Quest, false));
        q.advance(reviewed(ItemKind::Treasure, true));
        q.advance(reviewed(ItemKind::BossQuestion, true));
        assert_eq!(q.progress, 0);
        q.advance(reviewed(ItemKind::Quest, true));
        assert_eq!(q.progress, 1);
    }

    #[test]
    fn test_master_treasure_counts_any_treasure_review() {
        let mut q = quest(QuestType::MasterTreasure, 5, 0);
        q.advance(reviewed(ItemKind::Treasure, false));
        q.advance(reviewed(ItemKind::Treasure, true));
        q.advance(reviewed(ItemKind::Quest, true));
        assert_eq!(q.progress, 2);
    }

    #[test]
    fn test_boss_attempt_only_moves_attempt_quests() {
        let mut attempt = quest(QuestType::AttemptBoss, 1, 0);
        let mut review = quest(QuestType::Review, 5, 0);

        assert_eq!(review.advance(QuestEvent::BossAttempt), None);
        assert_eq!(review.progress, 0);
        assert_eq!(attempt.advance(reviewed(ItemKind::BossQuestion, true)), None);
        assert_eq!(attempt.advance(QuestEvent::BossAttempt), Some(40));
        assert!(attempt.completed);
    }

    #[test]
    fn test_progress_never_exceeds_target() {
        let mut q = quest(QuestType::Review, 2, 0);
        for _ in 0..10 {
            q.advance(reviewed(ItemKind::Quest, true));
        }
        assert_eq!(q.progress, 2);
    }
}
