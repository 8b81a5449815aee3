//! # Policy Ingestion Pipeline
//!
//! Given a stored file identifier, this module determines whether the file's
//! binary content is intact (`validate`) and, if so, turns it into plain text
//! suitable for prompting (`extract_text`). Text extraction is delegated to
//! an external service; when that service is unavailable the pipeline falls
//! back to interpreting the raw bytes as UTF-8.
//!
//! Expected failure modes (empty file, service down, unreadable bytes) are
//! signaled through the [`ExtractOutcome`] enum rather than sentinel strings,
//! leaving it to the caller to decide how a placeholder is rendered.

use crate::blob;
use crate::constants::{PDF_MAGIC, RAW_TEXT_FALLBACK_MAX_CHARS};
use crate::errors::NexusError;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument, warn};
use turso::Database;

/// Result of a chunk-completeness check.
///
/// `valid` is a pure function of the declared size, the chunk size, and the
/// actual chunk count. A missing file record folds into `valid = false` with
/// all counts zeroed; callers must not rely on this struct to distinguish
/// "missing" from "corrupt".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkValidation {
    pub valid: bool,
    pub expected_chunks: u64,
    pub actual_chunks: u64,
    pub size_bytes: u64,
}

impl ChunkValidation {
    fn invalid() -> Self {
        Self {
            valid: false,
            expected_chunks: 0,
            actual_chunks: 0,
            size_bytes: 0,
        }
    }
}

/// Checks that a stored file has exactly the chunk count its metadata
/// implies.
///
/// Zero-chunk files and chunk-count mismatches are both invalid; there is no
/// partial-recovery path. Read-only and idempotent.
pub async fn validate(db: &Database, file_id: &str) -> Result<ChunkValidation, NexusError> {
    let Some(file) = blob::get_file(db, file_id).await? else {
        return Ok(ChunkValidation::invalid());
    };

    let expected = blob::expected_chunks(file.size_bytes, file.chunk_size_bytes);
    let actual = blob::count_chunks(db, file_id).await?;

    Ok(ChunkValidation {
        valid: actual > 0 && actual == expected,
        expected_chunks: expected,
        actual_chunks: actual,
        size_bytes: file.size_bytes,
    })
}

/// Outcome of a text-extraction attempt. Always produced for the expected
/// failure modes; hard storage errors surface as `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Extracted (or fallback-decoded) plain text.
    Text(String),
    /// The reassembled file had no bytes at all.
    Empty,
    /// The extraction service failed and the raw bytes are not usable as text.
    Unavailable,
}

// --- External extraction service client ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionRequest<'a> {
    buffer: String,
    content_type: &'a str,
    filename: &'a str,
    query: &'a str,
}

#[derive(Deserialize)]
struct ExtractionResponse {
    text: String,
}

/// Client for the external text-extraction endpoint.
#[derive(Clone, Debug)]
pub struct TextExtractor {
    client: ReqwestClient,
    api_url: String,
}

impl TextExtractor {
    /// Creates a new extractor client with a bounded per-call timeout.
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, NexusError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(NexusError::ReqwestClientBuild)?;
        Ok(Self { client, api_url })
    }

    /// Submits raw bytes to the extraction service and returns its text.
    async fn extract(
        &self,
        bytes: &[u8],
        content_type: &str,
        filename: &str,
        query: &str,
    ) -> Result<String, NexusError> {
        let request_body = ExtractionRequest {
            buffer: general_purpose::STANDARD.encode(bytes),
            content_type,
            filename,
            query,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(NexusError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NexusError::AiApi(error_text));
        }

        let extraction: ExtractionResponse = response
            .json()
            .await
            .map_err(NexusError::AiDeserialization)?;

        Ok(extraction.text)
    }
}

/// Reassembles a file and extracts plain text from it.
///
/// This operation does not re-validate chunk completeness; callers must gate
/// on [`validate`] first. Extraction on an incomplete file produces
/// undefined, partial output.
#[instrument(skip(db, extractor))]
pub async fn extract_text(
    db: &Database,
    extractor: &TextExtractor,
    file_id: &str,
    query: &str,
) -> Result<ExtractOutcome, NexusError> {
    let Some(file) = blob::get_file(db, file_id).await? else {
        return Ok(ExtractOutcome::Unavailable);
    };

    let bytes = blob::read_file_bytes(db, file_id).await?;
    if bytes.is_empty() {
        info!(file_id = %file_id, "File has no content, skipping extraction.");
        return Ok(ExtractOutcome::Empty);
    }

    match extractor
        .extract(&bytes, &file.content_type, &file.filename, query)
        .await
    {
        Ok(text) => Ok(ExtractOutcome::Text(text)),
        Err(e) => {
            warn!(
                file_id = %file_id,
                error = %e,
                "Extraction service failed, falling back to raw text interpretation."
            );
            Ok(fallback_from_bytes(&bytes))
        }
    }
}

/// Best-effort interpretation of raw bytes as text when the extraction
/// service is unavailable.
///
/// Bytes carrying the PDF magic marker are never served raw; everything else
/// that decodes to non-empty UTF-8 is returned, capped at
/// `RAW_TEXT_FALLBACK_MAX_CHARS` characters.
pub fn fallback_from_bytes(bytes: &[u8]) -> ExtractOutcome {
    if bytes.len() >= PDF_MAGIC.len() && &bytes[..PDF_MAGIC.len()] == PDF_MAGIC {
        return ExtractOutcome::Unavailable;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) if !text.trim().is_empty() => {
            let capped: String = text.chars().take(RAW_TEXT_FALLBACK_MAX_CHARS).collect();
            ExtractOutcome::Text(capped)
        }
        _ => ExtractOutcome::Unavailable,
    }
}
