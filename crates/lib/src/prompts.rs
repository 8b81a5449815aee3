//! # Default Prompts
//!
//! Centralizes the prompt templates used by the chat relay. The server's
//! configuration layer uses these as programmatic defaults, so deployments
//! can override any of them in `config.yml` without touching code.

/// System prompt for the onboarding chat task.
pub const CHAT_SYSTEM_PROMPT: &str = "You are an HR onboarding assistant for {company_name}. \
Answer the employee's question using only the provided company information and policy excerpts. \
If the excerpts do not cover the question, say so plainly instead of inventing policy details. \
Keep answers short and practical.";

/// User prompt template for the onboarding chat task.
///
/// Placeholders: `{message}`, `{company_context}`, `{policy_context}`,
/// `{employee_name}`.
pub const CHAT_USER_PROMPT: &str = r#"# Company
{company_context}

# Policy Excerpts
{policy_context}

# Employee
{employee_name}

# Question
{message}"#;
