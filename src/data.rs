use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::{
    BossData, ConceptMap, ConceptMapEdge, ConceptMapNode, Flashcard, Mood, QuizQuestion,
    WorldData, ZoneData,
};
use crate::quests::QuestType;

pub struct QuestTemplate {
    pub id: &'static str,
    pub description: &'static str,
    pub target: u32,
    pub reward: u32,
    pub quest_type: QuestType,
}

pub const DAILY_QUEST_CATALOG: &[QuestTemplate] = &[
    QuestTemplate { id: "daily-review", description: "Review 5 items", target: 5, reward: 50, quest_type: QuestType::Review },
    QuestTemplate { id: "daily-master-quest", description: "Answer 3 quests correctly", target: 3, reward: 75, quest_type: QuestType::MasterQuest },
    QuestTemplate { id: "daily-attempt-boss", description: "Challenge the boss", target: 1, reward: 100, quest_type: QuestType::AttemptBoss },
    QuestTemplate { id: "daily-master-treasure", description: "Study 3 treasures", target: 3, reward: 50, quest_type: QuestType::MasterTreasure },
    QuestTemplate { id: "daily-review-marathon", description: "Review 15 items", target: 15, reward: 150, quest_type: QuestType::Review },
];

struct ZoneTemplate {
    name: &'static str,
    description: &'static str,
    theme_color: &'static str,
}

const OFFLINE_ZONES: &[ZoneTemplate] = &[
    ZoneTemplate { name: "Foundations Grove", description: "Where the first ideas from your notes take root.", theme_color: "#4CAF50" },
    ZoneTemplate { name: "Practice Peaks", description: "Climb by putting each idea to work.", theme_color: "#2196F3" },
    ZoneTemplate { name: "Reflection Reef", description: "Quiet waters for connecting what you learned.", theme_color: "#9C27B0" },
];

const FALLBACK_TERMS: &[&str] = &["the main idea", "a key detail", "a connection"];

/// Up to three distinct words of five or more letters from the notes, in
/// order of first appearance.
fn key_terms(notes: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in notes.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() < 5 {
            continue;
        }
        let word = word.to_lowercase();
        if !terms.contains(&word) {
            terms.push(word);
        }
        if terms.len() == OFFLINE_ZONES.len() {
            break;
        }
    }
    for fallback in FALLBACK_TERMS {
        if terms.len() == OFFLINE_ZONES.len() {
            break;
        }
        terms.push(fallback.to_string());
    }
    terms
}

fn seed_for(notes: &str, mood: Mood) -> u64 {
    let mut hasher = DefaultHasher::new();
    notes.hash(&mut hasher);
    mood.as_str().hash(&mut hasher);
    hasher.finish()
}

fn shuffled_question(
    rng: &mut StdRng,
    id: String,
    question: String,
    correct: &str,
    distractors: &[&str],
    explanation: String,
) -> QuizQuestion {
    let mut options: Vec<String> = distractors.iter().map(|d| d.to_string()).collect();
    options.push(correct.to_string());
    options.shuffle(rng);
    QuizQuestion {
        id,
        question,
        options,
        correct_answer: correct.to_string(),
        explanation,
    }
}

/// A structurally complete world built without the content service. The
/// same notes and mood always give the same world.
pub fn offline_world(notes: &str, mood: Mood) -> WorldData {
    let mut rng = StdRng::seed_from_u64(seed_for(notes, mood));
    let terms = key_terms(notes);

    let zones = OFFLINE_ZONES
        .iter()
        .zip(&terms)
        .enumerate()
        .map(|(i, (zone, term))| ZoneData {
            name: zone.name.to_string(),
            description: zone.description.to_string(),
            theme_color: zone.theme_color.to_string(),
            quest: shuffled_question(
                &mut rng,
                format!("offline-quest-{}", i + 1),
                format!("Which statement best describes \"{}\" in your notes?", term),
                "It is one of the central ideas",
                &["It is never mentioned", "It contradicts the notes", "It is an unrelated aside"],
                format!("\"{}\" appears as a key term in your notes.", term),
            ),
            treasure: Flashcard {
                id: format!("offline-treasure-{}", i + 1),
                term: term.clone(),
                definition: format!("Look up \"{}\" in your notes and explain it in your own words.", term),
            },
            interactive_challenge: None,
        })
        .collect();

    let battle = (1..=3)
        .map(|i| {
            shuffled_question(
                &mut rng,
                format!("offline-boss-{}", i),
                format!("Boss strike {}: which habit helps you remember your notes longest?", i),
                "Reviewing at growing intervals",
                &["Reading once the night before", "Never testing yourself", "Skipping reviews"],
                "Spaced review strengthens memory more than cramming.".to_string(),
            )
        })
        .collect();

    let nodes = terms
        .iter()
        .enumerate()
        .map(|(i, term)| ConceptMapNode {
            id: format!("node-{}", i + 1),
            label: term.clone(),
            x: 100.0 + 150.0 * i as f64,
            y: if i % 2 == 0 { 80.0 } else { 180.0 },
        })
        .collect::<Vec<_>>();
    let edges = nodes
        .windows(2)
        .map(|pair| ConceptMapEdge {
            from: pair[0].id.clone(),
            to: pair[1].id.clone(),
            label: Some("relates to".to_string()),
        })
        .collect();

    let description = match mood {
        Mood::Motivated => "An epic offline realm forged from your notes. Every zone hides a challenge.",
        Mood::Stressed | Mood::Overwhelmed => "A calm offline realm built from your notes. Take it one zone at a time, you've got this.",
        Mood::Sleepy => "A short offline realm built from your notes. Quick, focused stops only.",
    };

    WorldData {
        world_name: "The Offline Archive".to_string(),
        description: description.to_string(),
        zones,
        boss: BossData {
            name: "The Forgetting Fog".to_string(),
            description: "It feeds on everything you have not reviewed.".to_string(),
            weakness: "Spaced repetition".to_string(),
            battle,
        },
        concept_map: ConceptMap { nodes, edges },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_world_is_deterministic() {
        let a = offline_world("Photosynthesis converts sunlight", Mood::Sleepy);
        let b = offline_world("Photosynthesis converts sunlight", Mood::Sleepy);
        assert_eq!(a, b);
    }

    #[test]
    fn test_offline_world_shape() {
        let world = offline_world("Mitochondria produce energy for cells", Mood::Motivated);
        assert_eq!(world.zones.len(), 3);
        assert_eq!(world.boss.battle.len(), 3);
        assert_eq!(world.zones[0].treasure.term, "mitochondria");
        for zone in &world.zones {
            assert!(zone.quest.options.contains(&zone.quest.correct_answer));
            assert_eq!(zone.quest.options.len(), 4);
        }
        assert_eq!(world.concept_map.nodes.len(), 3);
        assert_eq!(world.concept_map.edges.len(), 2);
    }

    #[test]
    fn test_short_notes_use_fallback_terms() {
        let terms = key_terms("a b c");
        assert_eq!(terms, vec!["the main idea", "a key detail", "a connection"]);

        let terms = key_terms("Energy energy ENERGY cell");
        assert_eq!(terms, vec!["energy", "the main idea", "a key detail"]);
    }

    #[test]
    fn test_catalog_targets_are_positive() {
        assert!(DAILY_QUEST_CATALOG.len() >= crate::quests::DAILY_QUEST_COUNT);
        assert!(DAILY_QUEST_CATALOG.iter().all(|q| q.target > 0 && q.reward > 0));
    }
}
