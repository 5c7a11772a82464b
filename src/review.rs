use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ItemKind, MasteryItem, WorldDocument};
use crate::srs;

/// A tracked item together with where it sits in the world.
#[derive(Debug, Clone, Copy)]
pub struct ReviewEntry<'a> {
    pub kind: ItemKind,
    /// Zone name, or the boss name for battle questions.
    pub area: &'a str,
    pub item: &'a MasteryItem,
}

impl ReviewEntry<'_> {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        srs::is_due(self.item.next_review_date, today)
    }

    pub fn to_review_item(&self, today: NaiveDate) -> ReviewItem {
        ReviewItem {
            kind: self.kind,
            area: self.area.to_string(),
            due: self.is_due(today),
            item: self.item.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub kind: ItemKind,
    pub area: String,
    pub due: bool,
    pub item: MasteryItem,
}

/// Every item in world order: each zone's quest then treasure, boss last.
/// Cloning the iterator restarts the walk.
pub fn entries(world: &WorldDocument) -> impl Iterator<Item = ReviewEntry<'_>> + Clone + '_ {
    let zones = world.zones.iter().flat_map(move |zone| {
        [(ItemKind::Quest, &zone.quest), (ItemKind::Treasure, &zone.treasure)]
            .into_iter()
            .filter_map(move |(kind, id)| {
                world.item(id).map(|item| ReviewEntry {
                    kind,
                    area: &zone.name,
                    item,
                })
            })
    });

    let boss = world.boss.battle.iter().filter_map(move |id| {
        world.item(id).map(|item| ReviewEntry {
            kind: ItemKind::BossQuestion,
            area: &world.boss.name,
            item,
        })
    });

    zones.chain(boss)
}

/// Items whose review date is today or earlier, in world order.
pub fn due_items(
    world: &WorldDocument,
    today: NaiveDate,
) -> impl Iterator<Item = ReviewEntry<'_>> + Clone + '_ {
    entries(world).filter(move |entry| entry.is_due(today))
}

/// Every item of the world with its due flag.
pub fn compendium(world: &WorldDocument, today: NaiveDate) -> Vec<ReviewItem> {
    entries(world).map(|entry| entry.to_review_item(today)).collect()
}
