//! # SQLite Schema
//!
//! Centralizes the table-creation SQL for the NexusOne database. Keeping the
//! statements here isolates database-specific syntax from the core logic.

/// All statements required to bring a fresh database up to the current
/// schema. Every statement is idempotent (`IF NOT EXISTS`), so the list is
/// safe to run on every startup.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS companies (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT,
        industry    TEXT,
        created_at  DATETIME DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS employees (
        id           TEXT PRIMARY KEY,
        company_id   TEXT NOT NULL,
        display_name TEXT NOT NULL,
        created_at   DATETIME DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS policy_files (
        id               TEXT PRIMARY KEY,
        company_id       TEXT NOT NULL,
        filename         TEXT NOT NULL,
        content_type     TEXT NOT NULL,
        size_bytes       INTEGER NOT NULL,
        chunk_size_bytes INTEGER NOT NULL,
        uploaded_at      DATETIME DEFAULT CURRENT_TIMESTAMP,
        deleted_at       DATETIME
    );",
    "CREATE TABLE IF NOT EXISTS policy_chunks (
        file_id        TEXT NOT NULL,
        sequence_index INTEGER NOT NULL,
        payload        BLOB NOT NULL,
        PRIMARY KEY (file_id, sequence_index)
    );",
    "CREATE INDEX IF NOT EXISTS idx_policy_files_company ON policy_files (company_id);",
    "CREATE TABLE IF NOT EXISTS onboarding_tasks (
        company_id  TEXT NOT NULL,
        employee_id TEXT NOT NULL,
        task_id     TEXT NOT NULL,
        title       TEXT NOT NULL,
        status      TEXT NOT NULL DEFAULT 'pending',
        PRIMARY KEY (employee_id, task_id)
    );",
    "CREATE TABLE IF NOT EXISTS onboarding_policy_acks (
        company_id   TEXT NOT NULL,
        employee_id  TEXT NOT NULL,
        policy_id    TEXT NOT NULL,
        acknowledged INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (employee_id, policy_id)
    );",
    "CREATE TABLE IF NOT EXISTS onboarding_documents (
        company_id  TEXT NOT NULL,
        employee_id TEXT NOT NULL,
        document_id TEXT NOT NULL,
        status      TEXT NOT NULL DEFAULT 'pending_review',
        PRIMARY KEY (employee_id, document_id)
    );",
];
