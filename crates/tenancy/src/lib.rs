//! # Tenancy Crate
//!
//! This crate is the central authority for tenant identity in NexusOne:
//! companies (tenants) and the employees that belong to them. Every piece of
//! tenant data elsewhere in the system is scoped by the `company_id` values
//! minted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use turso::{params, Database, Error as TursoError, Row};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TenancyError {
    #[error("Database error: {0}")]
    Database(#[from] TursoError),
    #[error("Failed to create or find employee for identifier: {0}")]
    EmployeePersistenceFailed(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

/// One customer company. All data in the system is scoped by its id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An employee of one company.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Employee {
    /// The unique, deterministic ID of the employee (UUIDv5 from an external
    /// identifier such as the JWT subject).
    pub id: String,
    pub company_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TenancyError> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        .map_err(|e| TenancyError::DataIntegrity(format!("Failed to parse date '{raw}': {e}")))
}

impl TryFrom<&Row> for Company {
    type Error = TenancyError;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        let created_at_str: String = row.get(4)?;
        Ok(Company {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get::<String>(2).ok(),
            industry: row.get::<String>(3).ok(),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

impl TryFrom<&Row> for Employee {
    type Error = TenancyError;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        let created_at_str: String = row.get(3)?;
        Ok(Employee {
            id: row.get(0)?,
            company_id: row.get(1)?,
            display_name: row.get(2)?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

/// Registers a new company and returns it.
pub async fn create_company(
    db: &Database,
    name: &str,
    description: Option<&str>,
    industry: Option<&str>,
) -> Result<Company, TenancyError> {
    let conn = db.connect()?;
    let company_id = Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO companies (id, name, description, industry) VALUES (?, ?, ?, ?)",
        params![company_id.clone(), name, description, industry],
    )
    .await?;
    info!(company_id = %company_id, name = %name, "Registered new company.");

    get_company(db, &company_id)
        .await?
        .ok_or_else(|| TenancyError::DataIntegrity(format!("company '{company_id}' vanished after insert")))
}

/// Looks up a company by id.
pub async fn get_company(db: &Database, company_id: &str) -> Result<Option<Company>, TenancyError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, name, description, industry, created_at FROM companies WHERE id = ?",
            params![company_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(Company::try_from(&row)?)),
        None => Ok(None),
    }
}

/// Finds an employee by their unique external identifier (e.g. email or
/// token sub), creating them under the given company if they don't exist.
///
/// This function creates a deterministic UUIDv5 from the identifier to use
/// as the primary key, ensuring idempotency.
pub async fn get_or_create_employee(
    db: &Database,
    employee_identifier: &str,
    company_id: &str,
    display_name: &str,
) -> Result<Employee, TenancyError> {
    let conn = db.connect()?;
    let employee_id =
        Uuid::new_v5(&Uuid::NAMESPACE_URL, employee_identifier.as_bytes()).to_string();

    // Try to SELECT the employee first for maximum compatibility.
    let mut rows = conn
        .query(
            "SELECT id, company_id, display_name, created_at FROM employees WHERE id = ?",
            params![employee_id.clone()],
        )
        .await?;

    if let Some(row) = rows.next().await? {
        return Employee::try_from(&row);
    }

    conn.execute(
        "INSERT INTO employees (id, company_id, display_name) VALUES (?, ?, ?)",
        params![employee_id.clone(), company_id, display_name],
    )
    .await?;

    // SELECT the newly created employee to get all fields (like created_at).
    let mut rows = conn
        .query(
            "SELECT id, company_id, display_name, created_at FROM employees WHERE id = ?",
            params![employee_id],
        )
        .await?;

    let row = rows
        .next()
        .await?
        .ok_or_else(|| TenancyError::EmployeePersistenceFailed(employee_identifier.to_string()))?;

    Employee::try_from(&row)
}
