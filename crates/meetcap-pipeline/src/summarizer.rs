//! Section summarization.
//!
//! A capability with two variants chosen at construction: model-backed
//! (OpenAI-compatible chat endpoint) or pure-local. Callers never branch on
//! which is active — any model failure falls back to the deterministic
//! local extractor with a warning.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use meetcap_models::Section;

/// Words that mark a sentence as a likely key point.
const EMPHASIS_WORDS: &[&str] = &[
    "important",
    "key",
    "critical",
    "note that",
    "remember",
    "focus on",
    "main",
    "primary",
];

/// Character budget for the fallback summary head.
const FALLBACK_SUMMARY_CHARS: usize = 100;

/// Request timeout for the model endpoint.
const MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Attaches summary and key points to transcript sections.
pub struct SectionSummarizer {
    model: Option<ModelClient>,
    max_key_points: usize,
}

impl SectionSummarizer {
    /// Pure-local variant; deterministic and side-effect-free.
    pub fn local(max_key_points: usize) -> Self {
        Self {
            model: None,
            max_key_points,
        }
    }

    /// Model-backed variant.
    pub fn with_model(client: ModelClient, max_key_points: usize) -> Self {
        Self {
            model: Some(client),
            max_key_points,
        }
    }

    /// Model-backed when an API key is configured, local otherwise.
    pub fn from_env(max_key_points: usize) -> Self {
        match ModelClient::from_env() {
            Some(client) => {
                info!("Section summarizer using model '{}'", client.model);
                Self::with_model(client, max_key_points)
            }
            None => {
                info!("No model API key configured, using local summarizer");
                Self::local(max_key_points)
            }
        }
    }

    /// Fill in `summary` and `key_points` for one section.
    pub async fn enrich(&self, section: &mut Section) {
        let text = section.text();
        let word_count = text.split_whitespace().count();
        let duration_min = section.duration() / 60.0;

        section.summary = match self.model_summary(&text, word_count, duration_min).await {
            Some(summary) => summary,
            None => local_summary(&text, word_count, duration_min),
        };

        section.key_points = match self.model_key_points(&text).await {
            Some(points) => points,
            None => local_key_points(&text, self.max_key_points),
        };
    }

    async fn model_summary(&self, text: &str, word_count: usize, duration_min: f64) -> Option<String> {
        let client = self.model.as_ref()?;
        match client.summarize(text, word_count, duration_min).await {
            Ok(summary) => Some(format!(
                "{} ({} words, {:.1} min)",
                summary, word_count, duration_min
            )),
            Err(e) => {
                warn!("Model summarization failed, falling back: {}", e);
                None
            }
        }
    }

    async fn model_key_points(&self, text: &str) -> Option<Vec<String>> {
        let client = self.model.as_ref()?;
        match client.extract_key_points(text, self.max_key_points).await {
            Ok(points) if !points.is_empty() => Some(points),
            Ok(_) => {
                warn!("Model returned no key points, falling back");
                None
            }
            Err(e) => {
                warn!("Model key point extraction failed, falling back: {}", e);
                None
            }
        }
    }
}

/// Deterministic fallback summary: first 100 characters plus size suffix.
fn local_summary(text: &str, word_count: usize, duration_min: f64) -> String {
    let head: String = if text.chars().count() <= FALLBACK_SUMMARY_CHARS {
        text.to_string()
    } else {
        let mut head: String = text.chars().take(FALLBACK_SUMMARY_CHARS).collect();
        head.push_str("...");
        head
    };
    format!("{} ({} words, {:.1} min)", head, word_count, duration_min)
}

/// Deterministic fallback key points: emphasis-word sentences from the
/// leading sentences, or the leading sentences themselves when nothing
/// matches.
fn local_key_points(text: &str, max_points: usize) -> Vec<String> {
    let sentences: Vec<&str> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut points: Vec<String> = sentences
        .iter()
        .take(max_points)
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            EMPHASIS_WORDS.iter().any(|w| lower.contains(w))
        })
        .map(|s| s.to_string())
        .collect();

    if points.is_empty() {
        points = sentences
            .iter()
            .take(max_points)
            .map(|s| s.to_string())
            .collect();
    }

    points.truncate(max_points);
    points
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct ModelClient {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl ModelClient {
    /// Create from environment; `None` when no API key is configured.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }

        Some(Self {
            api_key,
            endpoint: std::env::var("MEETCAP_MODEL_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            model: std::env::var("MEETCAP_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            client: Client::new(),
        })
    }

    pub async fn summarize(
        &self,
        text: &str,
        word_count: usize,
        duration_min: f64,
    ) -> anyhow::Result<String> {
        let prompt = format!(
            "Summarize the following video transcript segment in 2-3 concise sentences. \
             Focus on the main topics, key information, and important points discussed.\n\n\
             Transcript ({} words, {:.1} minutes):\n{}\n\nSummary:",
            word_count, duration_min, text
        );

        self.chat(
            "You are an expert at summarizing video transcripts. \
             Provide clear, concise summaries that capture the main points.",
            prompt,
            200,
        )
        .await
    }

    pub async fn extract_key_points(&self, text: &str, max_points: usize) -> anyhow::Result<Vec<String>> {
        let prompt = format!(
            "Extract the {} most important key points from this video transcript segment.\n\
             Focus on:\n\
             - Main topics discussed\n\
             - Important facts or information\n\
             - Action items or decisions\n\
             - Critical insights or conclusions\n\n\
             Format as a bulleted list.\n\nTranscript:\n{}\n\nKey Points:",
            max_points, text
        );

        let content = self
            .chat(
                "You are an expert at analyzing video transcripts and extracting key \
                 information. Provide clear, actionable key points.",
                prompt,
                300,
            )
            .await?;

        let mut points = parse_bullet_lines(&content);
        points.truncate(max_points);
        Ok(points)
    }

    async fn chat(
        &self,
        system: &'static str,
        prompt: String,
        max_tokens: u32,
    ) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature: 0.3,
        };

        debug!("Calling model endpoint {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(MODEL_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            anyhow::bail!("model returned an empty response");
        }
        Ok(content)
    }
}

/// Parse a bulleted or numbered list into plain lines.
fn parse_bullet_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let mut line = line.trim();
            if let Some(stripped) = line
                .strip_prefix('-')
                .or_else(|| line.strip_prefix('*'))
                .or_else(|| line.strip_prefix('•'))
            {
                line = stripped.trim();
            } else if line
                .chars()
                .next()
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
            {
                if let Some((_, rest)) = line.split_once('.') {
                    line = rest.trim();
                }
            }
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetcap_models::TranscriptFragment;

    fn section(text: &str) -> Section {
        Section {
            number: 1,
            start_time: 0.0,
            end_time: 60.0,
            fragments: vec![TranscriptFragment {
                id: 0,
                start_time: 0.0,
                end_time: 60.0,
                text: text.to_string(),
                confidence: 1.0,
            }],
            summary: String::new(),
            key_points: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_local_enrichment_is_deterministic() {
        let summarizer = SectionSummarizer::local(5);
        let mut first = section("The main point is budget. We agreed on the timeline.");
        let mut second = first.clone();

        summarizer.enrich(&mut first).await;
        summarizer.enrich(&mut second).await;

        assert_eq!(first.summary, second.summary);
        assert_eq!(first.key_points, second.key_points);
        assert!(!first.summary.is_empty());
    }

    #[tokio::test]
    async fn test_emphasis_sentences_become_key_points() {
        let summarizer = SectionSummarizer::local(5);
        let mut section = section(
            "We chatted about the weather. The important decision is to ship Friday. \
             Lunch was good.",
        );
        summarizer.enrich(&mut section).await;

        assert_eq!(section.key_points.len(), 1);
        assert!(section.key_points[0].contains("important decision"));
    }

    #[test]
    fn test_key_points_fall_back_to_leading_sentences() {
        let points = local_key_points("First thing. Second thing. Third thing.", 2);
        assert_eq!(points, vec!["First thing".to_string(), "Second thing".to_string()]);
    }

    #[test]
    fn test_summary_truncates_long_text() {
        let text = "x".repeat(500);
        let summary = local_summary(&text, 1, 1.0);
        assert!(summary.starts_with(&"x".repeat(100)));
        assert!(summary.contains("..."));
        assert!(summary.contains("(1 words, 1.0 min)"));
    }

    #[test]
    fn test_short_text_is_kept_whole() {
        let summary = local_summary("Short recap", 2, 0.5);
        assert_eq!(summary, "Short recap (2 words, 0.5 min)");
    }

    #[test]
    fn test_parse_bullet_lines() {
        let content = "- First point\n* Second point\n3. Third point\n\n• Fourth";
        let points = parse_bullet_lines(content);
        assert_eq!(points, vec!["First point", "Second point", "Third point", "Fourth"]);
    }
}
