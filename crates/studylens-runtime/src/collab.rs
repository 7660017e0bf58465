//! Collaborators - services the monitor talks to but does not implement
//!
//! The language model, the video search backend and the progress display
//! are opaque. Failures are caught by the monitor and turned into a chat
//! message or a log line; they never touch attention or gesture state.
//!
//! Assistant and search calls are remote and slow, so they run as an
//! [`Inquiry`] outside the monitor and come back as an [`InquiryOutcome`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use studylens_core::{StudyError, StudyResult, Timestamp};

/// Instruction given to the assistant ahead of every student question
pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are an AI study companion. Help students understand concepts, answer questions, and provide educational guidance. Be encouraging and supportive.";

/// Chat assistant backed by a hosted language model
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Submit a user turn; returns the response as streamed token chunks
    async fn submit(&self, user_text: &str) -> StudyResult<Vec<String>>;
}

/// Video recommendation backend
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> StudyResult<Vec<VideoResult>>;
}

/// Receives the running focused-seconds total
pub trait ProgressSink: Send {
    fn report_focused_seconds(&mut self, total_seconds: u64) -> StudyResult<()>;
}

/// One recommended video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResult {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: String,
    pub duration: Option<String>,
}

impl VideoResult {
    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id)
    }
}

/// Offline recommendations: three study videos titled after the query
#[derive(Debug, Clone, Default)]
pub struct CannedVideoSearch;

impl CannedVideoSearch {
    const CATALOG: [(&'static str, &'static str, &'static str, &'static str); 3] = [
        ("dQw4w9WgXcQ", "Study Guide", "Educational Channel", "10:30"),
        ("jNQXAC9IVRw", "Tutorial", "Learn Academy", "15:45"),
        ("M7lc1UVf-VE", "Quick Review", "Study Hub", "8:20"),
    ];
}

#[async_trait]
impl VideoSearch for CannedVideoSearch {
    async fn search(&self, query: &str, max_results: usize) -> StudyResult<Vec<VideoResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StudyError::collaborator("video search", "empty query"));
        }

        Ok(Self::CATALOG
            .iter()
            .take(max_results)
            .map(|(id, prefix, channel, duration)| {
                let title = if *prefix == "Tutorial" {
                    format!("{}: {} Explained", prefix, query)
                } else {
                    format!("{}: {}", prefix, query)
                };
                VideoResult {
                    id: id.to_string(),
                    title,
                    channel: channel.to_string(),
                    thumbnail: format!("https://img.youtube.com/vi/{}/mqdefault.jpg", id),
                    duration: Some(duration.to_string()),
                }
            })
            .collect())
    }
}

/// A finalized question on its way to the assistant and video search
pub struct Inquiry {
    pub id: u64,
    pub text: String,
    assistant: Arc<dyn Assistant>,
    videos: Arc<dyn VideoSearch>,
    max_results: usize,
    timeout: Duration,
}

impl Inquiry {
    pub(crate) fn new(
        id: u64,
        text: String,
        assistant: Arc<dyn Assistant>,
        videos: Arc<dyn VideoSearch>,
        max_results: usize,
        timeout: Duration,
    ) -> Self {
        Inquiry {
            id,
            text,
            assistant,
            videos,
            max_results,
            timeout,
        }
    }

    /// Ask the assistant and search for videos at the same time
    pub async fn resolve(self) -> InquiryOutcome {
        debug!(id = self.id, "inquiry sent");
        let (reply, videos) = tokio::join!(
            bounded("assistant", self.timeout, self.assistant.submit(&self.text)),
            bounded(
                "video search",
                self.timeout,
                self.videos.search(&self.text, self.max_results)
            ),
        );
        InquiryOutcome {
            id: self.id,
            text: self.text,
            reply,
            videos,
        }
    }
}

impl std::fmt::Debug for Inquiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inquiry")
            .field("id", &self.id)
            .field("text", &self.text)
            .finish()
    }
}

async fn bounded<T>(
    service: &'static str,
    limit: Duration,
    call: impl std::future::Future<Output = StudyResult<T>>,
) -> StudyResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StudyError::collaborator(service, "request timed out")),
    }
}

/// What came back for one inquiry
#[derive(Debug, Clone, PartialEq)]
pub struct InquiryOutcome {
    pub id: u64,
    pub text: String,
    pub reply: StudyResult<Vec<String>>,
    pub videos: StudyResult<Vec<VideoResult>>,
}

/// Who wrote a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub at: Timestamp,
    /// Set on apology turns produced from a collaborator failure
    pub failed: bool,
}

/// Conversation history shown in the chat panel
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    turns: Vec<ChatTurn>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: &str, at: Timestamp) {
        self.turns.push(ChatTurn {
            role: ChatRole::User,
            text: text.to_string(),
            at,
            failed: false,
        });
    }

    /// Append an assistant turn assembled from streamed chunks
    pub fn push_assistant(&mut self, chunks: &[String], at: Timestamp) {
        self.turns.push(ChatTurn {
            role: ChatRole::Assistant,
            text: chunks.concat(),
            at,
            failed: false,
        });
    }

    /// Append the apology shown when the assistant call fails
    pub fn push_failure(&mut self, error: &StudyError, at: Timestamp) {
        let detail = match error {
            StudyError::Collaborator { message, .. } => message.clone(),
            other => other.to_string(),
        };
        self.turns.push(ChatTurn {
            role: ChatRole::Assistant,
            text: format!("Sorry, I encountered an error: {}. Please try again.", detail),
            at,
            failed: true,
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&ChatTurn> {
        self.turns.get(index)
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
