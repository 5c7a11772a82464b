use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analytics::UserAnalytics;
use crate::error::GenerationError;
use crate::models::{Mood, WorldData};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

fn quiz_question_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "A unique identifier for this question, e.g., 'concept-a1b2'." },
            "question": { "type": "STRING" },
            "options": { "type": "ARRAY", "items": { "type": "STRING" } },
            "correctAnswer": { "type": "STRING" },
            "explanation": { "type": "STRING", "description": "A brief explanation for the correct answer." }
        },
        "required": ["id", "question", "options", "correctAnswer", "explanation"]
    })
}

fn flashcard_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "A unique identifier for this flashcard, e.g., 'term-c3d4'." },
            "term": { "type": "STRING", "description": "A key term from the notes." },
            "definition": { "type": "STRING", "description": "A concise definition." }
        },
        "required": ["id", "term", "definition"]
    })
}

/// Structured-output schema for one world.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "worldName": { "type": "STRING", "description": "An epic name for the learning world, like 'The Quantum Realm of Biology'." },
            "description": { "type": "STRING", "description": "A short, exciting overview of the world." },
            "zones": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Themed name for a zone, e.g., 'Forest of Physics'." },
                        "description": { "type": "STRING", "description": "Brief, engaging description of this zone." },
                        "themeColor": { "type": "STRING", "description": "A hex color code (e.g. #FF5733) that fits the zone's theme." },
                        "quest": quiz_question_schema(),
                        "treasure": flashcard_schema()
                    },
                    "required": ["name", "description", "themeColor", "quest", "treasure"]
                }
            },
            "boss": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING", "description": "A creative boss name based on a weak topic, e.g. 'The Chloroplast Dragon'." },
                    "description": { "type": "STRING", "description": "A dramatic description of the boss." },
                    "weakness": { "type": "STRING", "description": "The core concept the student struggles with." },
                    "battle": { "type": "ARRAY", "items": quiz_question_schema() }
                },
                "required": ["name", "description", "weakness", "battle"]
            },
            "conceptMap": {
                "type": "OBJECT",
                "properties": {
                    "nodes": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "id": { "type": "STRING" },
                                "label": { "type": "STRING" },
                                "x": { "type": "NUMBER" },
                                "y": { "type": "NUMBER" }
                            },
                            "required": ["id", "label", "x", "y"]
                        }
                    },
                    "edges": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "from": { "type": "STRING" },
                                "to": { "type": "STRING" },
                                "label": { "type": "STRING" }
                            },
                            "required": ["from", "to"]
                        }
                    }
                }
            }
        },
        "required": ["worldName", "description", "zones", "boss"]
    })
}

fn mood_instruction(mood: Mood) -> &'static str {
    match mood {
        Mood::Motivated => "The student is motivated: make the challenges harder and the descriptions more epic.",
        Mood::Stressed | Mood::Overwhelmed => "The student is stressed or overwhelmed: make the questions easier, the world more calming, and add encouraging messages.",
        Mood::Sleepy => "The student is sleepy: keep sessions short and focused with clearer, simpler questions.",
    }
}

fn adaptation_instruction(analytics: &UserAnalytics) -> String {
    let mut lines = vec!["Adapt this world to the student's play so far:".to_string()];
    match analytics.quest_accuracy() {
        Some(accuracy) if accuracy < 60.0 => lines.push(format!(
            "- Quest accuracy is {:.0}%. Make quiz questions more approachable and explanations clearer.",
            accuracy
        )),
        Some(accuracy) => lines.push(format!(
            "- Quest accuracy is {:.0}%. The student can handle tougher quiz questions.",
            accuracy
        )),
        None => lines.push("- The student has not answered any quests yet.".to_string()),
    }
    if let Some(accuracy) = analytics.boss_accuracy() {
        lines.push(format!("- Boss battle accuracy is {:.0}%.", accuracy));
    }
    lines.push(format!(
        "- Preferred activity: {}. Lean the content towards it.",
        analytics.preferred_activity().label()
    ));
    lines.join("\n")
}

pub fn build_prompt(
    notes: &str,
    mood: Mood,
    analytics: Option<&UserAnalytics>,
    today: NaiveDate,
) -> String {
    let adaptation = analytics
        .map(|a| format!("\n{}\n", adaptation_instruction(a)))
        .unwrap_or_default();

    format!(
        r#"You are LearnScape AI, a game designer that transforms educational notes into an exciting, personalized learning game world.
Analyze the user's notes, identify key concepts, and generate a complete game world as a JSON object.

{mood}
{adaptation}
Today's date is {today}.
All 'id' fields must be short, unique, random alphanumeric strings.

Here are the user's notes:
---
{notes}
---

1. Create a grand name and description for the entire world.
2. Identify 3-4 main topics and turn them into themed zones. Each zone needs a quest (a multiple-choice question) and a treasure (a flashcard).
3. Identify the most challenging or foundational concept and create a boss battle for it: a series of 3 tough multiple-choice questions.
4. Add a small concept map linking the main topics.
5. Output only JSON that follows the provided schema."#,
        mood = mood_instruction(mood),
        adaptation = adaptation,
        today = today.format("%Y-%m-%d"),
        notes = notes,
    )
}

/// Pulls the first candidate's text out of a Gemini response and parses it.
pub fn parse_world(raw: &str) -> Result<WorldData, GenerationError> {
    let response: GeminiResponse = serde_json::from_str(raw)?;
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or(GenerationError::EmptyResponse)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(serde_json::from_str(text)?)
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate_world(
        &self,
        notes: &str,
        mood: Mood,
        analytics: Option<&UserAnalytics>,
        today: NaiveDate,
    ) -> Result<WorldData, GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::NotConfigured);
        }

        let body = json!({
            "contents": [{
                "parts": [{ "text": build_prompt(notes, mood, analytics, today) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        debug!("Requesting world from {}", url);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(GenerationError::Api { status, body });
        }

        let raw = resp.text().await?;
        parse_world(&raw)
    }
}
