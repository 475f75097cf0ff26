//! Fictional resident personas used as guessing-game clues
//!
//! The selected city is handed to the model as hidden ground truth. The model
//! writes the clues; the answer block always comes from the catalog record,
//! since nothing the model says about coordinates or names can be trusted.

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::core::types::City;
use crate::llm::client::LlmClient;

/// Everyday-life snippets shown to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSnippets {
    pub slang: String,
    pub food: String,
    pub habits: String,
    pub media: String,
}

/// Clue fields shown before the player guesses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaClues {
    pub name: String,
    pub age: u32,
    pub job: String,
    pub routine: String,
    pub social_snippets: SocialSnippets,
    pub fun_fact: String,
}

/// Answer revealed after the guess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaAnswer {
    pub correct_city: String,
    pub correct_location: String,
    pub correct_lat: f64,
    pub correct_lon: f64,
    pub continent: String,
}

impl From<&City> for PersonaAnswer {
    fn from(city: &City) -> Self {
        Self {
            correct_city: city.name.clone(),
            correct_location: city.location_label(),
            correct_lat: city.lat,
            correct_lon: city.lon,
            continent: city.continent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub clues: PersonaClues,
    pub answer: PersonaAnswer,
}

impl Persona {
    /// Clue fields that mention the city or country by name
    pub fn leaks_answer(&self, city: &City) -> Vec<&'static str> {
        let banned = [city.name.to_lowercase(), city.country.to_lowercase()];
        let clues = &self.clues;
        let fields: [(&'static str, &str); 8] = [
            ("job", &clues.job),
            ("routine", &clues.routine),
            ("slang", &clues.social_snippets.slang),
            ("food", &clues.social_snippets.food),
            ("habits", &clues.social_snippets.habits),
            ("media", &clues.social_snippets.media),
            ("funFact", &clues.fun_fact),
            ("name", &clues.name),
        ];

        fields
            .into_iter()
            .filter(|(_, text)| {
                let text = text.to_lowercase();
                banned.iter().any(|word| !word.is_empty() && text.contains(word.as_str()))
            })
            .map(|(field, _)| field)
            .collect()
    }
}

/// Generate a persona for `city`
pub async fn generate_persona(client: &LlmClient, city: &City) -> Result<Persona> {
    let response = client
        .complete(PERSONA_SYSTEM_PROMPT, &persona_user_prompt(city))
        .await?;
    tracing::debug!("Raw persona response for {}: {}", city.name, response);

    let persona = parse_persona(&response, city)?;
    let leaks = persona.leaks_answer(city);
    if !leaks.is_empty() {
        tracing::warn!("Persona for {} names the answer in {:?}", city.name, leaks);
    }
    Ok(persona)
}

/// Parse a model response into a persona whose answer is `city`
pub fn parse_persona(response: &str, city: &City) -> Result<Persona> {
    let cleaned = strip_code_fences(response);
    let json_str = extract_json(&cleaned)?;

    let clues: PersonaClues = serde_json::from_str(json_str).map_err(|e| {
        GameError::PersonaParse(format!("Failed to parse persona: {} - Response: {}", e, response))
    })?;

    Ok(Persona {
        clues,
        answer: PersonaAnswer::from(city),
    })
}

fn strip_code_fences(response: &str) -> String {
    response.replace("```json", "").replace("```", "").trim().to_string()
}

/// Extract JSON object from LLM response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| GameError::PersonaParse("No JSON object found".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| GameError::PersonaParse("No closing brace found in response".into()))?;
    Ok(&response[start..=end])
}

/// User prompt carrying the hidden city
pub fn persona_user_prompt(city: &City) -> String {
    let landmarks = if city.landmarks.is_empty() {
        "none listed".to_string()
    } else {
        city.landmarks.join(", ")
    };

    format!(
        "HIDDEN CITY (never name it, or its country, in clue fields):\n\
         City: {}\nRegion: {}\nCountry: {}\nContinent: {}\nKnown landmarks: {}\n\n\
         Write one resident persona for this city as JSON:",
        city.name,
        if city.region.is_empty() { "unknown" } else { city.region.as_str() },
        city.country,
        city.continent,
        landmarks
    )
}

/// System prompt for persona generation
pub const PERSONA_SYSTEM_PROMPT: &str = r#"You write fictional residents for a geography guessing game.
The player reads the persona and tries to guess the city the person lives in.

CLUE RULES:
- job: a globally common role (teacher, developer, delivery driver, store clerk). Nothing that hints at the place.
- routine: daily habits shaped by climate, religion, transport, working hours and the rhythm of the city.
- socialSnippets: authentic slang, food, habits and media. Local dishes are fine if their names do not contain a city or country name.
- Mention the local currency by name or as a price (for example "paid 12 rupees for lunch").
- Famous landmarks and parks may be named.
- funFact: a quirky detail about the city such as a festival, urban myth or odd law.

NEVER:
- Name the city or the country in any field.
- Use terms that contain the city or country name ("Turkish delight", "Brazilian beach").
- Pick a job title that gives the location away.

OUTPUT FORMAT (strict JSON only, no commentary):
{
  "name": string,
  "age": integer,
  "job": string,
  "routine": string,
  "socialSnippets": {
    "slang": string,
    "food": string,
    "habits": string,
    "media": string
  },
  "funFact": string
}
"#;
