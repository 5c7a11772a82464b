use std::time::Instant;

use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::analytics::{AnalyticsSummary, UserAnalytics};
use crate::content::ContentService;
use crate::error::{GenerationError, SessionError};
use crate::feedback::FeedbackGenerator;
use crate::history::WorldHistory;
use crate::models::{ItemKind, Mood, WorldData, WorldDocument, WorldView};
use crate::progression::{LevelUpNotice, PlayerState, XP_PER_FAILURE, XP_PER_SUCCESS};
use crate::quests::{self, DailyQuest, QuestCompletion, QuestEvent};
use crate::review::{self, ReviewItem};
use crate::srs;

pub const EMPTY_NOTES_MESSAGE: &str = "Please enter some notes to generate a world.";
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate the learning world. The AI might be overwhelmed. Please try again with simpler notes.";
pub const ADAPT_FAILED_MESSAGE: &str = "Failed to adapt the learning world. The AI might be having a moment. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Upload,
    Loading,
    World,
}

/// What to do with a world once it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationTarget {
    /// New world after the cursor.
    Append,
    /// Adapted world swapped in at this history index.
    Replace(usize),
}

/// Everything needed to run one generation outside the session.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: u64,
    pub notes: String,
    pub mood: Mood,
    pub analytics: Option<UserAnalytics>,
    pub today: NaiveDate,
    pub target: GenerationTarget,
}

impl GenerationRequest {
    pub async fn run(&self, content: &ContentService) -> Result<WorldData, GenerationError> {
        content
            .generate_world(&self.notes, self.mood, self.analytics.as_ref(), self.today)
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Applied,
    Failed(String),
    /// No generation with this id was pending.
    Stale,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryOutcome {
    pub item_id: String,
    pub kind: ItemKind,
    pub previous_level: u8,
    pub mastery_level: u8,
    pub next_review_date: NaiveDate,
    pub xp_gained: u32,
    pub leveled_up: bool,
    pub completed_quests: Vec<QuestCompletion>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub index: Option<usize>,
    pub len: usize,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub screen: Screen,
    pub generating: bool,
    pub error: Option<String>,
    pub mood: Mood,
    pub player: PlayerState,
    pub level_up: Option<String>,
    pub daily_quests: Vec<DailyQuest>,
    pub analytics: AnalyticsSummary,
    pub history: HistoryView,
    pub due_count: usize,
    pub world: Option<WorldView>,
}

/// The learner's whole session. Every change goes through a method here.
pub struct App {
    screen: Screen,
    history: WorldHistory,
    player: PlayerState,
    daily_quests: Vec<DailyQuest>,
    analytics: UserAnalytics,
    mood: Mood,
    error: Option<String>,
    level_up: Option<LevelUpNotice>,
    pending: Option<GenerationRequest>,
    next_request_id: u64,
    fixed_today: Option<NaiveDate>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            screen: Screen::Upload,
            history: WorldHistory::default(),
            player: PlayerState::default(),
            daily_quests: Vec::new(),
            analytics: UserAnalytics::default(),
            mood: Mood::default(),
            error: None,
            level_up: None,
            pending: None,
            next_request_id: 1,
            fixed_today: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn current_world(&self) -> Option<&WorldDocument> {
        self.history.current()
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    // --- Generation ---

    pub fn begin_generate(
        &mut self,
        notes: &str,
        mood: Mood,
    ) -> Result<GenerationRequest, SessionError> {
        if self.pending.is_some() {
            warn!("Ignoring generate request, a world is already being generated");
            return Err(SessionError::GenerationInProgress);
        }
        if notes.trim().is_empty() {
            self.error = Some(EMPTY_NOTES_MESSAGE.to_string());
            return Err(SessionError::Validation(EMPTY_NOTES_MESSAGE.to_string()));
        }

        self.mood = mood;
        let request = self.start_request(notes.to_string(), None, GenerationTarget::Append);
        info!("Generating world #{} ({} mood)", request.id, mood.as_str());
        Ok(request)
    }

    /// Regenerates the current world from its own notes, the current mood and
    /// the analytics so far.
    pub fn begin_adapt(&mut self) -> Result<GenerationRequest, SessionError> {
        if self.pending.is_some() {
            warn!("Ignoring adapt request, a world is already being generated");
            return Err(SessionError::GenerationInProgress);
        }
        let (Some(index), Some(world)) = (self.history.cursor(), self.history.current()) else {
            return Err(SessionError::NoCurrentWorld);
        };

        let notes = world.source_notes.clone();
        let analytics = Some(self.analytics);
        let request = self.start_request(notes, analytics, GenerationTarget::Replace(index));
        info!("Adapting world {} as request #{}", index, request.id);
        Ok(request)
    }

    fn start_request(
        &mut self,
        notes: String,
        analytics: Option<UserAnalytics>,
        target: GenerationTarget,
    ) -> GenerationRequest {
        let request = GenerationRequest {
            id: self.next_request_id,
            notes,
            mood: self.mood,
            analytics,
            today: self.today(),
            target,
        };
        self.next_request_id += 1;
        self.error = None;
        self.screen = Screen::Loading;
        self.pending = Some(request.clone());
        request
    }

    /// Applies the result of a pending generation. A result that arrives after
    /// the user cancelled is still applied to history; only the screen is left
    /// where the user moved it.
    pub fn finish_generation(
        &mut self,
        request_id: u64,
        result: Result<WorldData, GenerationError>,
    ) -> GenerationOutcome {
        let request = match self.pending.take() {
            Some(request) if request.id == request_id => request,
            other => {
                self.pending = other;
                warn!("Dropping result of unknown generation #{}", request_id);
                return GenerationOutcome::Stale;
            }
        };
        let was_loading = self.screen == Screen::Loading;

        match result {
            Ok(data) => {
                let world = WorldDocument::from_data(data, &request.notes, request.today);
                match request.target {
                    GenerationTarget::Append => {
                        info!(
                            "World '{}' ready with {} items (request #{})",
                            world.name,
                            world.item_count(),
                            request.id
                        );
                        self.history.push(world);
                        self.redraw_daily_quests();
                    }
                    GenerationTarget::Replace(index) => {
                        info!("World {} adapted into '{}'", index, world.name);
                        if self.history.replace(index, world) && self.history.cursor() == Some(index) {
                            self.redraw_daily_quests();
                        }
                    }
                }
                if was_loading {
                    self.screen = Screen::World;
                }
                GenerationOutcome::Applied
            }
            Err(e) => {
                error!("Generation #{} failed: {}", request.id, e);
                let message = match request.target {
                    GenerationTarget::Append => GENERATE_FAILED_MESSAGE,
                    GenerationTarget::Replace(_) => ADAPT_FAILED_MESSAGE,
                };
                self.error = Some(message.to_string());
                if was_loading {
                    self.screen = match request.target {
                        GenerationTarget::Append => Screen::Upload,
                        GenerationTarget::Replace(_) if self.history.current().is_some() => {
                            Screen::World
                        }
                        GenerationTarget::Replace(_) => Screen::Upload,
                    };
                }
                GenerationOutcome::Failed(message.to_string())
            }
        }
    }

    pub async fn generate_world(
        &mut self,
        content: &ContentService,
        notes: &str,
        mood: Mood,
    ) -> Result<GenerationOutcome, SessionError> {
        let request = self.begin_generate(notes, mood)?;
        let result = request.run(content).await;
        Ok(self.finish_generation(request.id, result))
    }

    pub async fn adapt_world(
        &mut self,
        content: &ContentService,
    ) -> Result<GenerationOutcome, SessionError> {
        let request = self.begin_adapt()?;
        let result = request.run(content).await;
        Ok(self.finish_generation(request.id, result))
    }

    // --- Screens & history ---

    /// Leaves the loading screen. The request keeps running.
    pub fn cancel_generation(&mut self) {
        if self.screen != Screen::Loading {
            return;
        }
        self.screen = if self.history.is_empty() {
            Screen::Upload
        } else {
            Screen::World
        };
        info!("Left loading screen, generation continues in the background");
    }

    pub fn go_to_upload(&mut self) {
        if self.screen == Screen::World {
            self.screen = Screen::Upload;
        }
    }

    pub fn back_to_world(&mut self) -> bool {
        if self.screen == Screen::Upload && self.history.current().is_some() {
            self.screen = Screen::World;
            return true;
        }
        false
    }

    pub fn previous_world(&mut self) -> bool {
        let moved = self.history.go_previous();
        if moved {
            debug!("Moved back to world {:?}", self.history.cursor());
            self.redraw_daily_quests();
        }
        moved
    }

    pub fn next_world(&mut self) -> bool {
        let moved = self.history.go_next();
        if moved {
            debug!("Moved forward to world {:?}", self.history.cursor());
            self.redraw_daily_quests();
        }
        moved
    }

    fn redraw_daily_quests(&mut self) {
        self.daily_quests = quests::draw_daily_quests();
    }

    // --- Reviews ---

    /// Routes one review outcome to the scheduler, the XP ledger, the daily
    /// quests and analytics. Only the current world is searched; an unknown
    /// id changes nothing and returns `None`.
    pub fn handle_update_mastery(
        &mut self,
        item_id: &str,
        success: bool,
        kind: ItemKind,
    ) -> Option<MasteryOutcome> {
        let today = self.today();
        let Some(world) = self.history.current_mut() else {
            warn!("Mastery update for {} with no current world", item_id);
            return None;
        };
        let Some(found_kind) = world.locate(item_id) else {
            warn!("Mastery update for unknown item {}", item_id);
            return None;
        };
        if found_kind != kind {
            warn!(
                "Item {} reported as {:?} but sits in a {:?} slot",
                item_id, kind, found_kind
            );
        }
        let item = world.item_mut(item_id)?;

        let previous_level = item.mastery_level;
        let (level, next_review_date) = srs::schedule(previous_level, success, today);
        item.mastery_level = level;
        item.next_review_date = next_review_date;
        let message = FeedbackGenerator::review_message(item, success, today);
        let item_id = item.id().to_string();

        let now = Instant::now();
        let base_xp = if success { XP_PER_SUCCESS } else { XP_PER_FAILURE };
        let mut leveled_up = self.grant_xp(base_xp, now);

        self.analytics = self.analytics.record(found_kind, success);

        let completed_quests = quests::advance(
            &mut self.daily_quests,
            QuestEvent::Reviewed {
                kind: found_kind,
                success,
            },
        );
        let mut xp_gained = base_xp;
        for completion in &completed_quests {
            info!("Daily quest '{}' complete (+{} XP)", completion.description, completion.reward);
            leveled_up |= self.grant_xp(completion.reward, now);
            xp_gained += completion.reward;
        }

        Some(MasteryOutcome {
            item_id,
            kind: found_kind,
            previous_level,
            mastery_level: level,
            next_review_date,
            xp_gained,
            leveled_up,
            completed_quests,
            message,
        })
    }

    /// Counts the start of a boss battle for daily quests.
    pub fn attempt_boss(&mut self) -> Vec<QuestCompletion> {
        if self.history.current().is_none() {
            return Vec::new();
        }
        let completed = quests::advance(&mut self.daily_quests, QuestEvent::BossAttempt);
        let now = Instant::now();
        for completion in &completed {
            info!("Daily quest '{}' complete (+{} XP)", completion.description, completion.reward);
            self.grant_xp(completion.reward, now);
        }
        completed
    }

    fn grant_xp(&mut self, amount: u32, now: Instant) -> bool {
        let (player, leveled_up) = self.player.add_xp(amount);
        self.player = player;
        if leveled_up {
            info!("Level up! Now level {}", player.level);
            self.level_up = Some(LevelUpNotice::new(player.level, now));
        }
        leveled_up
    }

    // --- Level-up banner ---

    pub fn level_up_notice(&self, now: Instant) -> Option<&LevelUpNotice> {
        self.level_up.as_ref().filter(|notice| !notice.is_expired(now))
    }

    /// Clears the level-up banner once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.level_up.is_some_and(|notice| notice.is_expired(now)) {
            self.level_up = None;
        }
    }

    // --- Read views ---

    pub fn due_reviews(&self) -> Vec<ReviewItem> {
        let today = self.today();
        self.current_world()
            .map(|world| {
                review::due_items(world, today)
                    .map(|entry| entry.to_review_item(today))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn compendium(&self) -> Vec<ReviewItem> {
        self.current_world()
            .map(|world| review::compendium(world, self.today()))
            .unwrap_or_default()
    }

    pub fn snapshot(&self, now: Instant) -> SessionView {
        let today = self.today();
        let world = self.current_world();
        SessionView {
            screen: self.screen,
            generating: self.is_generating(),
            error: self.error.clone(),
            mood: self.mood,
            player: self.player,
            level_up: self.level_up_notice(now).map(|notice| notice.message()),
            daily_quests: self.daily_quests.clone(),
            analytics: self.analytics.summary(),
            history: HistoryView {
                index: self.history.cursor(),
                len: self.history.len(),
                can_go_previous: self.history.can_go_previous(),
                can_go_next: self.history.can_go_next(),
            },
            due_count: world.map_or(0, |w| review::due_items(w, today).count()),
            world: world.map(WorldDocument::view),
        }
    }
}

// Accessors for callers embedding the session directly; the HTTP layer only
// reads snapshots.
#[allow(unused)]
impl App {
    /// Pins the calendar date used for scheduling.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn player(&self) -> PlayerState {
        self.player
    }

    pub fn daily_quests(&self) -> &[DailyQuest] {
        &self.daily_quests
    }

    pub fn analytics(&self) -> UserAnalytics {
        self.analytics
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn history(&self) -> &WorldHistory {
        &self.history
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
