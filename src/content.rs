use chrono::NaiveDate;
use log::{info, warn};

use crate::analytics::UserAnalytics;
use crate::config::Config;
use crate::data::offline_world;
use crate::error::GenerationError;
use crate::gemini::GeminiClient;
use crate::models::{Mood, WorldData};

/// Picks where generated worlds come from: Gemini when a key is configured,
/// the offline generator otherwise.
#[derive(Clone)]
pub struct ContentService {
    gemini: Option<GeminiClient>,
    offline_fallback: bool,
}

impl ContentService {
    pub fn from_config(config: &Config) -> Self {
        let Some(key) = config.gemini_api_key.clone() else {
            info!("No Gemini API key set, generating offline worlds");
            return Self::offline();
        };

        info!("Generating worlds with Gemini model {}", config.gemini_model);
        Self {
            gemini: Some(GeminiClient::new(key, config.gemini_model.clone())),
            offline_fallback: config.offline_fallback,
        }
    }

    /// Always uses the offline generator.
    pub fn offline() -> Self {
        Self {
            gemini: None,
            offline_fallback: false,
        }
    }

    pub async fn generate_world(
        &self,
        notes: &str,
        mood: Mood,
        analytics: Option<&UserAnalytics>,
        today: NaiveDate,
    ) -> Result<WorldData, GenerationError> {
        let Some(gemini) = &self.gemini else {
            return Ok(offline_world(notes, mood));
        };

        match gemini.generate_world(notes, mood, analytics, today).await {
            Ok(world) => Ok(world),
            Err(e) if self.offline_fallback => {
                warn!("Gemini generation failed, using offline world: {}", e);
                Ok(offline_world(notes, mood))
            }
            Err(e) => Err(e),
        }
    }
}
