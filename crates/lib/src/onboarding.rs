//! # Onboarding Records
//!
//! Per-employee tracking of onboarding tasks, policy acknowledgements, and
//! document review status, plus the derived progress aggregate returned with
//! every chat answer. The aggregate is recomputed on every read and never
//! stored redundantly.

use crate::errors::NexusError;
use serde::{Deserialize, Serialize};
use tracing::info;
use turso::{params, Database};

/// Lifecycle of one onboarding task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Review state of one uploaded employee document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::PendingReview => "pending_review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_review" => Some(DocumentStatus::PendingReview),
            "approved" => Some(DocumentStatus::Approved),
            "rejected" => Some(DocumentStatus::Rejected),
            _ => None,
        }
    }
}

/// Read-only progress aggregate over an employee's onboarding record.
///
/// An employee with no record at all yields the all-zero aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub total_policies: u64,
    pub acknowledged_policies: u64,
}

/// Recomputes the onboarding aggregate for one employee.
pub async fn status(
    db: &Database,
    company_id: &str,
    employee_id: &str,
) -> Result<OnboardingStatus, NexusError> {
    let conn = db.connect()?;

    let mut rows = conn
        .query(
            "SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0)
             FROM onboarding_tasks WHERE company_id = ? AND employee_id = ?",
            params![company_id, employee_id],
        )
        .await?;
    let (total_tasks, completed_tasks) = match rows.next().await? {
        Some(row) => (row.get::<i64>(0)? as u64, row.get::<i64>(1)? as u64),
        None => (0, 0),
    };

    let mut rows = conn
        .query(
            "SELECT COUNT(*), COALESCE(SUM(acknowledged), 0)
             FROM onboarding_policy_acks WHERE company_id = ? AND employee_id = ?",
            params![company_id, employee_id],
        )
        .await?;
    let (total_policies, acknowledged_policies) = match rows.next().await? {
        Some(row) => (row.get::<i64>(0)? as u64, row.get::<i64>(1)? as u64),
        None => (0, 0),
    };

    Ok(OnboardingStatus {
        total_tasks,
        completed_tasks,
        total_policies,
        acknowledged_policies,
    })
}

/// Creates or refreshes a task row for an employee.
pub async fn upsert_task(
    db: &Database,
    company_id: &str,
    employee_id: &str,
    task_id: &str,
    title: &str,
    status: TaskStatus,
) -> Result<(), NexusError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO onboarding_tasks (company_id, employee_id, task_id, title, status)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(employee_id, task_id) DO UPDATE SET title=excluded.title, status=excluded.status",
        params![company_id, employee_id, task_id, title, status.as_str()],
    )
    .await?;
    Ok(())
}

/// Moves an existing task to a new status. Returns `false` when the task
/// does not exist for this employee.
pub async fn set_task_status(
    db: &Database,
    company_id: &str,
    employee_id: &str,
    task_id: &str,
    status: TaskStatus,
) -> Result<bool, NexusError> {
    let conn = db.connect()?;
    let changed = conn
        .execute(
            "UPDATE onboarding_tasks SET status = ?
             WHERE company_id = ? AND employee_id = ? AND task_id = ?",
            params![status.as_str(), company_id, employee_id, task_id],
        )
        .await?;
    Ok(changed > 0)
}

/// Records that the employee acknowledged a policy. Idempotent.
pub async fn acknowledge_policy(
    db: &Database,
    company_id: &str,
    employee_id: &str,
    policy_id: &str,
) -> Result<(), NexusError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO onboarding_policy_acks (company_id, employee_id, policy_id, acknowledged)
         VALUES (?, ?, ?, 1)
         ON CONFLICT(employee_id, policy_id) DO UPDATE SET acknowledged=1",
        params![company_id, employee_id, policy_id],
    )
    .await?;
    info!(employee_id = %employee_id, policy_id = %policy_id, "Policy acknowledged.");
    Ok(())
}

/// Assigns a policy to an employee's record without acknowledging it.
/// Existing acknowledgements are preserved.
pub async fn assign_policy(
    db: &Database,
    company_id: &str,
    employee_id: &str,
    policy_id: &str,
) -> Result<(), NexusError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO onboarding_policy_acks (company_id, employee_id, policy_id, acknowledged)
         VALUES (?, ?, ?, 0)
         ON CONFLICT(employee_id, policy_id) DO NOTHING",
        params![company_id, employee_id, policy_id],
    )
    .await?;
    Ok(())
}

/// Sets the review decision for an employee document, creating the row if
/// the document was never registered.
pub async fn set_document_status(
    db: &Database,
    company_id: &str,
    employee_id: &str,
    document_id: &str,
    status: DocumentStatus,
) -> Result<(), NexusError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO onboarding_documents (company_id, employee_id, document_id, status)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(employee_id, document_id) DO UPDATE SET status=excluded.status",
        params![company_id, employee_id, document_id, status.as_str()],
    )
    .await?;
    Ok(())
}
