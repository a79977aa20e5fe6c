//! Per-user session state and the advisor operations that act on it.
//!
//! A [`Session`] is plain data owned by the caller. [`Advisor`] holds the
//! loaded datasets and settings and is shared by every call; each
//! operation receives the session explicitly.

use crate::analysis;
use crate::chat::ChatService;
use crate::context;
use crate::dataset::Datasets;
use crate::errors::{DataError, SessionError};
use crate::models::{
    CityDataset, ConversationTurn, PointEstimate, ReportMetadata, SessionReport, SummaryRow,
    BOOKED_NIGHTS_PER_MONTH,
};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// State for one logged-in user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    username: Option<String>,
    city: Option<String>,
    summary: Vec<SummaryRow>,
    summary_text: String,
    last_estimate: Option<PointEstimate>,
    estimate_note: Option<String>,
    transcript: Vec<ConversationTurn>,
    /// Set once a question is submitted for the current city.
    question_asked: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn summary(&self) -> &[SummaryRow] {
        &self.summary
    }

    pub fn last_estimate(&self) -> Option<&PointEstimate> {
        self.last_estimate.as_ref()
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Whether a question was submitted since the city was selected,
    /// even if no reply arrived.
    pub fn question_asked(&self) -> bool {
        self.question_asked
    }

    /// Forget the city and everything derived from it. The user stays logged in.
    pub fn clear_city(&mut self) {
        let username = self.username.take();
        *self = Self {
            username,
            ..Self::default()
        };
    }
}

/// Tunables for [`Advisor`].
#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    pub booked_nights: f64,
    /// Extra attempts after a retryable chat failure.
    pub retries: usize,
    /// Delay before the first retry; grows linearly.
    pub retry_backoff: Duration,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            booked_nights: BOOKED_NIGHTS_PER_MONTH,
            retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Entry point for every user interaction.
pub struct Advisor {
    datasets: Datasets,
    settings: AdvisorSettings,
}

impl Advisor {
    pub fn new(datasets: Datasets, settings: AdvisorSettings) -> Self {
        Self { datasets, settings }
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// The dataset for the session's current city.
    pub fn current_dataset(&self, session: &Session) -> Result<&CityDataset, SessionError> {
        let city = session.city().ok_or(SessionError::NoCitySelected)?;
        Ok(self.datasets.get(city)?)
    }

    /// Switch the session to a city and return its summary.
    ///
    /// Choosing a different city clears the transcript and last estimate;
    /// choosing the current city again keeps them.
    pub fn select_city<'s>(
        &self,
        session: &'s mut Session,
        name: &str,
    ) -> Result<&'s [SummaryRow], SessionError> {
        let dataset = self.datasets.get(name)?;

        if session.city() != Some(dataset.name.as_str()) {
            info!("Selected city {}", dataset.name);
            session.clear_city();
            session.city = Some(dataset.name.clone());
            session.summary = analysis::summarize(dataset);
            session.summary_text =
                context::format_summary(&dataset.name, &dataset.currency, &session.summary);
            debug!("Summary has {} rows", session.summary.len());
        }

        Ok(&session.summary)
    }

    /// Compute a point estimate and remember it as context for the assistant.
    pub fn estimate(
        &self,
        session: &mut Session,
        neighbourhood: &str,
        room_type: &str,
    ) -> Result<PointEstimate, SessionError> {
        let dataset = self.current_dataset(session)?;
        let estimate = analysis::estimate_with_nights(
            dataset,
            neighbourhood,
            room_type,
            self.settings.booked_nights,
        )?;

        session.estimate_note = Some(context::format_estimate_note(&dataset.currency, &estimate));
        session.last_estimate = Some(estimate.clone());

        Ok(estimate)
    }

    /// The system prompt that accompanies the next chat request.
    pub fn system_prompt(&self, session: &Session) -> Result<String, SessionError> {
        let city = session.city().ok_or(SessionError::NoCitySelected)?;
        Ok(context::build_system_prompt(
            city,
            &session.summary_text,
            session.estimate_note.as_deref(),
        ))
    }

    /// Send a user message and return the assistant's reply.
    ///
    /// Transient failures are retried. The transcript only grows when a
    /// reply arrives, so a failed turn leaves the session unchanged.
    pub async fn ask(
        &self,
        session: &mut Session,
        chat: &dyn ChatService,
        message: &str,
    ) -> Result<String, SessionError> {
        let dataset = self.current_dataset(session)?;
        if dataset.is_empty() {
            return Err(DataError::EmptyDataset {
                city: dataset.name.clone(),
            }
            .into());
        }

        let system_prompt = self.system_prompt(session)?;
        session.question_asked = true;
        let mut attempt = 0;

        let reply = loop {
            match chat.complete(&system_prompt, &session.transcript, message).await {
                Ok(reply) => break reply,
                Err(e) if e.is_retryable() && attempt < self.settings.retries => {
                    attempt += 1;
                    warn!(
                        "Chat request failed ({}), retrying ({}/{})",
                        e, attempt, self.settings.retries
                    );
                    tokio::time::sleep(self.settings.retry_backoff * attempt as u32).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        session.transcript.push(ConversationTurn::user(message));
        session.transcript.push(ConversationTurn::assistant(reply.clone()));

        Ok(reply)
    }

    /// Snapshot the session for export.
    pub fn report(&self, session: &Session, model_used: &str) -> Result<SessionReport, SessionError> {
        let dataset = self.current_dataset(session)?;

        Ok(SessionReport {
            metadata: ReportMetadata {
                city: dataset.name.clone(),
                generated_at: Utc::now(),
                model_used: model_used.to_string(),
                total_listings: dataset.len(),
                turns: session.transcript.len(),
            },
            currency: dataset.currency.clone(),
            summary: session.summary.clone(),
            estimate: session.last_estimate.clone(),
            transcript: session.transcript.clone(),
        })
    }
}
