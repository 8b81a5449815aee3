//! # Context Assembly & Chat Relay
//!
//! Turns one inbound chat message into one outbound answer. Policy-related
//! messages gather grounding context from the tenant's stored policy files
//! (validated, extracted, and section-filtered by the ingestion pipeline);
//! the assembled context and the message are relayed to the configured chat
//! provider in a single synchronous call. The onboarding progress aggregate
//! is recomputed alongside and returned with the answer.
//!
//! Failures local to one policy document are contained: they become inline
//! placeholder text in the context and never abort the request. A failure of
//! the chat provider itself fails the whole operation.

use crate::errors::NexusError;
use crate::ingest::{self, ExtractOutcome, TextExtractor};
use crate::onboarding::{self, OnboardingStatus};
use crate::providers::ai::ChatProvider;
use crate::relevance::RelevanceConfig;
use crate::blob;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use turso::Database;
use uuid::Uuid;

/// Explicit size budget for the assembled policy context. Without these
/// caps the prompt would grow with every uploaded document.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContextBudget {
    /// Maximum characters contributed by a single file's excerpt.
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,
    /// Total character budget for all per-file sections combined.
    #[serde(default = "default_max_total_chars")]
    pub max_total_chars: usize,
}

fn default_max_file_chars() -> usize {
    8_000
}

fn default_max_total_chars() -> usize {
    32_000
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_file_chars: default_max_file_chars(),
            max_total_chars: default_max_total_chars(),
        }
    }
}

/// Prompt pair for the chat task, resolved by the caller's configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChatPrompts<'a> {
    pub system_prompt: &'a str,
    pub user_prompt_template: &'a str,
}

/// One answered chat turn.
#[derive(Debug)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub onboarding_status: OnboardingStatus,
}

// User-visible placeholders embedded in the context when a document cannot
// contribute text. The pipeline itself reports tagged outcomes; rendering
// them as text happens only here.

pub fn corruption_placeholder(filename: &str) -> String {
    format!("[Document '{filename}' is missing or corrupted and could not be read. Please re-upload it.]")
}

pub fn empty_placeholder(filename: &str) -> String {
    format!("[Document '{filename}' appears to be empty.]")
}

pub fn unavailable_placeholder(filename: &str) -> String {
    format!("[Content of '{filename}' could not be extracted.]")
}

/// The chat relay, bundling the collaborators one message needs.
pub struct ChatRelay<'a> {
    db: &'a Database,
    extractor: &'a TextExtractor,
    provider: &'a dyn ChatProvider,
    relevance: &'a RelevanceConfig,
    budget: ContextBudget,
    prompts: ChatPrompts<'a>,
}

impl<'a> ChatRelay<'a> {
    pub fn new(
        db: &'a Database,
        extractor: &'a TextExtractor,
        provider: &'a dyn ChatProvider,
        relevance: &'a RelevanceConfig,
        budget: ContextBudget,
        prompts: ChatPrompts<'a>,
    ) -> Self {
        Self {
            db,
            extractor,
            provider,
            relevance,
            budget,
            prompts,
        }
    }

    /// Handles one inbound message for an employee of `company_id`.
    ///
    /// Fails with `CompanyNotFound` when the employee has no associated
    /// company, and with the provider's error when the completion call does
    /// not succeed. An onboarding-aggregate read failure degrades to the
    /// zeroed aggregate instead of failing the response.
    #[instrument(skip(self, message, session_id))]
    pub async fn handle_message(
        &self,
        company_id: &str,
        employee_id: &str,
        employee_name: &str,
        message: &str,
        session_id: Option<String>,
    ) -> Result<ChatReply, NexusError> {
        let company = tenancy::get_company(self.db, company_id)
            .await?
            .ok_or_else(|| NexusError::CompanyNotFound(company_id.to_string()))?;

        let policy_context = if self.relevance.is_policy_related(message)
            || self.relevance.is_general_query(message)
        {
            self.assemble_policy_context(company_id, message).await?
        } else {
            debug!("Message not classified as policy-related, skipping documents scan.");
            String::new()
        };

        let mut company_context = format!("Company: {}", company.name);
        if let Some(industry) = &company.industry {
            company_context.push_str(&format!("\nIndustry: {industry}"));
        }
        if let Some(description) = &company.description {
            company_context.push_str(&format!("\nDescription: {description}"));
        }

        let system_prompt = self
            .prompts
            .system_prompt
            .replace("{company_name}", &company.name);
        let rendered_policy_context = if policy_context.is_empty() {
            "(no policy documents were consulted for this question)".to_string()
        } else {
            policy_context
        };
        let user_prompt = self
            .prompts
            .user_prompt_template
            .replace("{company_context}", &company_context)
            .replace("{policy_context}", &rendered_policy_context)
            .replace("{employee_name}", employee_name)
            .replace("{message}", message);

        debug!(system_prompt = %system_prompt, user_prompt = %user_prompt, "--> Sending prompts to chat provider");
        let response = self.provider.generate(&system_prompt, &user_prompt).await?;

        let onboarding_status = match onboarding::status(self.db, company_id, employee_id).await {
            Ok(status) => status,
            Err(e) => {
                // Chat answers must not be blocked by metric lookup errors.
                warn!(error = %e, "Onboarding aggregate lookup failed, returning zeroed status.");
                OnboardingStatus::default()
            }
        };

        let session_id = session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(ChatReply {
            response,
            session_id,
            onboarding_status,
        })
    }

    /// Gathers per-file context sections for every included policy file.
    ///
    /// Files are processed sequentially in enumeration order, so section
    /// order is deterministic. One corrupt or unreadable file contributes a
    /// placeholder and never aborts the scan.
    async fn assemble_policy_context(
        &self,
        company_id: &str,
        message: &str,
    ) -> Result<String, NexusError> {
        let files = blob::list_files(self.db, company_id).await?;
        info!(count = files.len(), "Scanning tenant policy files for context.");

        let mut sections: Vec<String> = Vec::new();
        let mut total_chars = 0usize;

        for file in &files {
            if !self.relevance.file_is_relevant(message, &file.filename) {
                continue;
            }

            if total_chars >= self.budget.max_total_chars {
                debug!(
                    filename = %file.filename,
                    "Context budget exhausted, skipping remaining files."
                );
                break;
            }

            let body = match ingest::validate(self.db, &file.id).await {
                Ok(validation) if validation.valid => {
                    match ingest::extract_text(self.db, self.extractor, &file.id, message).await {
                        Ok(ExtractOutcome::Text(text)) if !text.trim().is_empty() => {
                            self.bounded_excerpt(&text, message)
                        }
                        Ok(ExtractOutcome::Text(_)) | Ok(ExtractOutcome::Unavailable) => {
                            unavailable_placeholder(&file.filename)
                        }
                        Ok(ExtractOutcome::Empty) => empty_placeholder(&file.filename),
                        Err(e) => {
                            // Mid-stream storage errors stay out of the user's way.
                            warn!(file_id = %file.id, error = %e, "Extraction errored hard.");
                            unavailable_placeholder(&file.filename)
                        }
                    }
                }
                Ok(validation) => {
                    warn!(
                        file_id = %file.id,
                        expected = validation.expected_chunks,
                        actual = validation.actual_chunks,
                        "Policy file failed chunk validation."
                    );
                    corruption_placeholder(&file.filename)
                }
                Err(e) => {
                    warn!(file_id = %file.id, error = %e, "Validation errored hard.");
                    corruption_placeholder(&file.filename)
                }
            };

            let section = format!("--- {} ---\n{}", file.filename, body);
            total_chars += section.chars().count();
            sections.push(section);
        }

        Ok(sections.join("\n\n"))
    }

    /// Applies the per-file budget: oversized documents are first filtered
    /// down to query-relevant sections, then hard-truncated.
    fn bounded_excerpt(&self, text: &str, message: &str) -> String {
        if text.chars().count() <= self.budget.max_file_chars {
            return text.to_string();
        }

        let filtered = self.relevance.select_relevant_section(text, message);
        if filtered.chars().count() <= self.budget.max_file_chars {
            filtered
        } else {
            filtered
                .chars()
                .take(self.budget.max_file_chars)
                .collect()
        }
    }
}
