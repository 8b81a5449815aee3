//! # Chunked Blob Store
//!
//! Stores uploaded policy files as a metadata row plus an ordered sequence of
//! fixed-size binary chunks, GridFS-style, inside SQLite. The ordering of
//! chunks by `sequence_index` is the correctness-critical invariant of this
//! module: reassembling chunks in order must reproduce the uploaded payload
//! byte-for-byte.

use crate::constants::DEFAULT_CHUNK_SIZE_BYTES;
use crate::errors::NexusError;
use tracing::{debug, info};
use turso::{params, Database, Value as TursoValue};
use uuid::Uuid;

/// Metadata for a stored policy file. Immutable after upload except for the
/// soft-delete marker.
#[derive(Debug, Clone)]
pub struct PolicyFile {
    pub id: String,
    pub company_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub chunk_size_bytes: u64,
    pub uploaded_at: String,
}

/// Number of chunks a fully uploaded file of `size_bytes` must have.
///
/// A zero-byte file has zero chunks, which `ingest::validate` treats as
/// unreadable.
pub fn expected_chunks(size_bytes: u64, chunk_size_bytes: u64) -> u64 {
    let chunk_size = if chunk_size_bytes == 0 {
        DEFAULT_CHUNK_SIZE_BYTES
    } else {
        chunk_size_bytes
    };
    size_bytes.div_ceil(chunk_size)
}

/// Splits `bytes` into chunks and persists the file under the given tenant.
///
/// Chunks are written with contiguous sequence indices `[0, n)`. The metadata
/// row is written first so a partially failed upload is observable as a
/// chunk-count mismatch rather than dangling chunks.
pub async fn store_file(
    db: &Database,
    company_id: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
    chunk_size_bytes: Option<u64>,
) -> Result<PolicyFile, NexusError> {
    let chunk_size = chunk_size_bytes.unwrap_or(DEFAULT_CHUNK_SIZE_BYTES);
    if chunk_size == 0 {
        return Err(NexusError::InvalidInput(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let conn = db.connect()?;
    let file_id = Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO policy_files (id, company_id, filename, content_type, size_bytes, chunk_size_bytes)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            file_id.clone(),
            company_id,
            filename,
            content_type,
            bytes.len() as i64,
            chunk_size as i64
        ],
    )
    .await?;

    for (index, chunk) in bytes.chunks(chunk_size as usize).enumerate() {
        conn.execute(
            "INSERT INTO policy_chunks (file_id, sequence_index, payload) VALUES (?, ?, ?)",
            params![file_id.clone(), index as i64, chunk],
        )
        .await?;
    }

    info!(
        file_id = %file_id,
        filename = %filename,
        size_bytes = bytes.len(),
        chunks = expected_chunks(bytes.len() as u64, chunk_size),
        "Stored policy file."
    );

    get_file(db, &file_id)
        .await?
        .ok_or_else(|| NexusError::PolicyFileNotFound(file_id))
}

/// Fetches a file's metadata by id, ignoring soft-deleted rows.
///
/// This lookup is tenant-agnostic; callers that act on behalf of a tenant
/// must check `company_id` on the returned record.
pub async fn get_file(db: &Database, file_id: &str) -> Result<Option<PolicyFile>, NexusError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, company_id, filename, content_type, size_bytes, chunk_size_bytes, uploaded_at
             FROM policy_files WHERE id = ? AND deleted_at IS NULL",
            params![file_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(PolicyFile {
            id: row.get(0)?,
            company_id: row.get(1)?,
            filename: row.get(2)?,
            content_type: row.get(3)?,
            size_bytes: row.get::<i64>(4)? as u64,
            chunk_size_bytes: row.get::<i64>(5)? as u64,
            uploaded_at: row.get(6).unwrap_or_default(),
        })),
        None => Ok(None),
    }
}

/// Lists all live policy files belonging to a tenant, newest first.
pub async fn list_files(db: &Database, company_id: &str) -> Result<Vec<PolicyFile>, NexusError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, company_id, filename, content_type, size_bytes, chunk_size_bytes, uploaded_at
             FROM policy_files
             WHERE company_id = ? AND deleted_at IS NULL
             ORDER BY uploaded_at DESC, id",
            params![company_id],
        )
        .await?;

    let mut files = Vec::new();
    while let Some(row) = rows.next().await? {
        files.push(PolicyFile {
            id: row.get(0)?,
            company_id: row.get(1)?,
            filename: row.get(2)?,
            content_type: row.get(3)?,
            size_bytes: row.get::<i64>(4)? as u64,
            chunk_size_bytes: row.get::<i64>(5)? as u64,
            uploaded_at: row.get(6).unwrap_or_default(),
        });
    }
    Ok(files)
}

/// Counts the chunks actually stored for a file.
pub async fn count_chunks(db: &Database, file_id: &str) -> Result<u64, NexusError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM policy_chunks WHERE file_id = ?",
            params![file_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(row.get::<i64>(0)? as u64),
        None => Ok(0),
    }
}

/// Reads and reassembles a file's payload.
///
/// Chunks are concatenated strictly in `sequence_index` order; the ORDER BY
/// clause carries the invariant. A file with no chunks yields an empty
/// buffer.
pub async fn read_file_bytes(db: &Database, file_id: &str) -> Result<Vec<u8>, NexusError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT payload FROM policy_chunks WHERE file_id = ? ORDER BY sequence_index ASC",
            params![file_id],
        )
        .await?;

    let mut buffer = Vec::new();
    while let Some(row) = rows.next().await? {
        match row.get_value(0)? {
            TursoValue::Blob(payload) => buffer.extend_from_slice(&payload),
            other => {
                return Err(NexusError::StorageOperationFailed(format!(
                    "unexpected chunk payload type: {other:?}"
                )))
            }
        }
    }

    debug!(file_id = %file_id, bytes = buffer.len(), "Reassembled file from chunks.");
    Ok(buffer)
}

/// Deletes a tenant's policy file and all of its chunks.
///
/// Returns `false` when the file does not exist or belongs to a different
/// tenant; the two cases are deliberately indistinguishable so that a
/// cross-tenant probe cannot confirm a file's existence.
pub async fn delete_file(
    db: &Database,
    company_id: &str,
    file_id: &str,
) -> Result<bool, NexusError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT 1 FROM policy_files WHERE id = ? AND company_id = ? AND deleted_at IS NULL",
            params![file_id, company_id],
        )
        .await?;
    if rows.next().await?.is_none() {
        return Ok(false);
    }

    conn.execute(
        "DELETE FROM policy_chunks WHERE file_id = ?",
        params![file_id],
    )
    .await?;
    conn.execute(
        "DELETE FROM policy_files WHERE id = ? AND company_id = ?",
        params![file_id, company_id],
    )
    .await?;

    info!(file_id = %file_id, company_id = %company_id, "Deleted policy file and its chunks.");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_chunks_math() {
        assert_eq!(expected_chunks(0, 261_120), 0);
        assert_eq!(expected_chunks(1, 261_120), 1);
        assert_eq!(expected_chunks(261_120, 261_120), 1);
        assert_eq!(expected_chunks(261_121, 261_120), 2);
        assert_eq!(expected_chunks(700_000, 261_120), 3);
    }

    #[test]
    fn test_expected_chunks_zero_chunk_size_falls_back_to_default() {
        assert_eq!(expected_chunks(700_000, 0), 3);
    }
}
