use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ItemId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Motivated,
    Stressed,
    Sleepy,
    Overwhelmed,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Motivated => "motivated",
            Mood::Stressed => "stressed",
            Mood::Sleepy => "sleepy",
            Mood::Overwhelmed => "overwhelmed",
        }
    }
}

/// Where a reviewed item lives in a world; decides which counters and quests move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Quest,
    Treasure,
    BossQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default)]
    pub id: ItemId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(default)]
    pub id: ItemId,
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveChallenge {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    /// Inline SVG markup.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMapNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMapEdge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptMap {
    #[serde(default)]
    pub nodes: Vec<ConceptMapNode>,
    #[serde(default)]
    pub edges: Vec<ConceptMapEdge>,
}

/// Nested world shape produced by a content generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldData {
    pub world_name: String,
    pub description: String,
    pub zones: Vec<ZoneData>,
    pub boss: BossData,
    #[serde(default)]
    pub concept_map: ConceptMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneData {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub theme_color: String,
    pub quest: QuizQuestion,
    pub treasure: Flashcard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive_challenge: Option<InteractiveChallenge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossData {
    pub name: String,
    pub description: String,
    pub weakness: String,
    pub battle: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemBody {
    Quiz(QuizQuestion),
    Flashcard(Flashcard),
}

impl ItemBody {
    pub fn id(&self) -> &str {
        match self {
            ItemBody::Quiz(q) => &q.id,
            ItemBody::Flashcard(f) => &f.id,
        }
    }

    fn set_id(&mut self, id: ItemId) {
        match self {
            ItemBody::Quiz(q) => q.id = id,
            ItemBody::Flashcard(f) => f.id = id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryItem {
    #[serde(flatten)]
    pub body: ItemBody,
    pub mastery_level: u8,
    pub next_review_date: NaiveDate,
}

impl MasteryItem {
    pub fn new(body: ItemBody, today: NaiveDate) -> Self {
        Self {
            body,
            mastery_level: 0,
            next_review_date: today,
        }
    }

    pub fn id(&self) -> &str {
        self.body.id()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub description: String,
    pub theme_color: String,
    pub quest: ItemId,
    pub treasure: ItemId,
    pub interactive_challenge: Option<InteractiveChallenge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    pub name: String,
    pub description: String,
    pub weakness: String,
    pub battle: Vec<ItemId>,
}

/// One generated world. Zones and the boss reference items by id; the items
/// themselves live in a flat map so a review touches exactly one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldDocument {
    pub name: String,
    pub description: String,
    pub zones: Vec<Zone>,
    pub boss: Boss,
    pub concept_map: ConceptMap,
    pub source_notes: String,
    items: HashMap<ItemId, MasteryItem>,
}

impl WorldDocument {
    /// Builds a document from generator output. Every item starts at mastery 0
    /// and is due today; blank or repeated ids are replaced so that ids stay
    /// unique across zones and boss.
    pub fn from_data(data: WorldData, source_notes: &str, today: NaiveDate) -> Self {
        let mut items = HashMap::new();
        let mut seen = HashSet::new();
        let mut insert = |mut body: ItemBody| -> ItemId {
            let id = body.id().trim().to_string();
            let id = if id.is_empty() || seen.contains(&id) {
                let fresh = format!("item-{}", Uuid::new_v4().simple());
                warn!("Replacing unusable item id {:?} with {}", id, fresh);
                fresh
            } else {
                id
            };
            seen.insert(id.clone());
            body.set_id(id.clone());
            items.insert(id.clone(), MasteryItem::new(body, today));
            id
        };

        let zones = data
            .zones
            .into_iter()
            .map(|zone| Zone {
                name: zone.name,
                description: zone.description,
                theme_color: zone.theme_color,
                quest: insert(ItemBody::Quiz(zone.quest)),
                treasure: insert(ItemBody::Flashcard(zone.treasure)),
                interactive_challenge: zone.interactive_challenge,
            })
            .collect();

        let battle = data
            .boss
            .battle
            .into_iter()
            .map(|question| insert(ItemBody::Quiz(question)))
            .collect();

        Self {
            name: data.world_name,
            description: data.description,
            zones,
            boss: Boss {
                name: data.boss.name,
                description: data.boss.description,
                weakness: data.boss.weakness,
                battle,
            },
            concept_map: data.concept_map,
            source_notes: source_notes.to_string(),
            items,
        }
    }

    pub fn item(&self, id: &str) -> Option<&MasteryItem> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut MasteryItem> {
        self.items.get_mut(id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Finds which slot of the world holds `id`, scanning zones then the boss.
    pub fn locate(&self, id: &str) -> Option<ItemKind> {
        self.zones
            .iter()
            .find_map(|zone| {
                if zone.quest == id {
                    Some(ItemKind::Quest)
                } else if zone.treasure == id {
                    Some(ItemKind::Treasure)
                } else {
                    None
                }
            })
            .or_else(|| {
                self.boss
                    .battle
                    .iter()
                    .any(|battle_id| battle_id == id)
                    .then_some(ItemKind::BossQuestion)
            })
    }

    /// Nested read view for presentation.
    pub fn view(&self) -> WorldView {
        let zones = self
            .zones
            .iter()
            .filter_map(|zone| {
                Some(ZoneView {
                    name: zone.name.clone(),
                    description: zone.description.clone(),
                    theme_color: zone.theme_color.clone(),
                    quest: self.item(&zone.quest)?.clone(),
                    treasure: self.item(&zone.treasure)?.clone(),
                    interactive_challenge: zone.interactive_challenge.clone(),
                })
            })
            .collect();

        WorldView {
            world_name: self.name.clone(),
            description: self.description.clone(),
            zones,
            boss: BossView {
                name: self.boss.name.clone(),
                description: self.boss.description.clone(),
                weakness: self.boss.weakness.clone(),
                battle: self
                    .boss
                    .battle
                    .iter()
                    .filter_map(|id| self.item(id).cloned())
                    .collect(),
            },
            concept_map: self.concept_map.clone(),
            source_notes: self.source_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldView {
    pub world_name: String,
    pub description: String,
    pub zones: Vec<ZoneView>,
    pub boss: BossView,
    pub concept_map: ConceptMap,
    pub source_notes: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneView {
    pub name: String,
    pub description: String,
    pub theme_color: String,
    pub quest: MasteryItem,
    pub treasure: MasteryItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_challenge: Option<InteractiveChallenge>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BossView {
    pub name: String,
    pub description: String,
    pub weakness: String,
    pub battle: Vec<MasteryItem>,
}
