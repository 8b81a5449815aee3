//! # NexusOne Test Utilities
//!
//! Shared fixtures for exercising the chunked blob store and the ingestion
//! pipeline in tests: deterministic payload generation and helpers for
//! damaging stored files in controlled ways.

use anyhow::Result;
use turso::{params, Database};

/// Generates a deterministic pseudo-random byte payload of the given length.
///
/// The same length always yields the same bytes, so round-trip assertions
/// stay reproducible across runs. The output is deliberately not valid UTF-8.
pub fn deterministic_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        })
        .collect()
}

/// Deletes the highest-indexed chunk of a stored file, producing a
/// chunk-count mismatch without touching the metadata.
pub async fn drop_last_chunk(db: &Database, file_id: &str) -> Result<()> {
    let conn = db.connect()?;
    conn.execute(
        "DELETE FROM policy_chunks WHERE file_id = ? AND sequence_index =
         (SELECT MAX(sequence_index) FROM policy_chunks WHERE file_id = ?)",
        params![file_id, file_id],
    )
    .await?;
    Ok(())
}

/// Deletes every chunk of a stored file, producing a zero-chunk file.
pub async fn drop_all_chunks(db: &Database, file_id: &str) -> Result<()> {
    let conn = db.connect()?;
    conn.execute(
        "DELETE FROM policy_chunks WHERE file_id = ?",
        params![file_id],
    )
    .await?;
    Ok(())
}

/// Swaps the payloads of two chunk indices, corrupting the reassembly order
/// while keeping the chunk count intact.
pub async fn swap_chunks(db: &Database, file_id: &str, a: i64, b: i64) -> Result<()> {
    let conn = db.connect()?;
    // Three-step swap through a sentinel index that no real file uses.
    conn.execute(
        "UPDATE policy_chunks SET sequence_index = -1 WHERE file_id = ? AND sequence_index = ?",
        params![file_id, a],
    )
    .await?;
    conn.execute(
        "UPDATE policy_chunks SET sequence_index = ? WHERE file_id = ? AND sequence_index = ?",
        params![a, file_id, b],
    )
    .await?;
    conn.execute(
        "UPDATE policy_chunks SET sequence_index = ? WHERE file_id = ? AND sequence_index = -1",
        params![b, file_id],
    )
    .await?;
    Ok(())
}
