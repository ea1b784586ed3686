//! The storage module persists wizard projects in SQLite. Each step's output
//! is stored as a JSON blob next to the project's status.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::analysis::Analysis;
use crate::constants::SCHEMA_VERSION;
use crate::email::EmailSequence;
use crate::funnel::Funnel;

/// Wizard progress of a project.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProjectStatus {
    New,
    Analyzed,
    FunnelGenerated,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Analyzed => "analyzed",
            Self::FunnelGenerated => "funnel_generated",
            Self::Completed => "completed",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Analyzed => 1,
            Self::FunnelGenerated => 2,
            Self::Completed => 3,
        }
    }

    /// A step may be re-run at its own level or advance the project by one step.
    pub fn can_advance_to(self, next: Self) -> bool {
        next.rank() == self.rank() || next.rank() == self.rank() + 1
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "new" => Ok(Self::New),
            "analyzed" => Ok(Self::Analyzed),
            "funnel_generated" => Ok(Self::FunnelGenerated),
            "completed" => Ok(Self::Completed),
            _ => Err(anyhow!("Invalid project status: {input}")),
        }
    }
}

/// Storage provides database operations for wizard projects.
pub struct Storage {
    /// The underlying SQLite connection wrapped in Arc<Mutex<>> to make it thread-safe
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    /// Creates a new Storage instance with a database at the specified path.
    ///
    /// # Arguments
    ///
    /// * `database_path` - Path where the database file should be created or opened,
    ///   or `:memory:` for a throwaway database
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .with_context(|| format!("Unable to open database {database_path}"))?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initializes the database schema with the projects table if it doesn't exist.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                status TEXT NOT NULL,
                schema_version INTEGER NOT NULL,
                analysis TEXT NULL,
                funnel_data TEXT NULL,
                email_sequence TEXT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            params![],
        )?;

        Ok(())
    }

    /// Creates an analyzed project and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn create_project(&self, name: &str, url: &str, analysis: &Analysis) -> Result<i64> {
        let blob = to_blob(analysis)?;
        let now = Utc::now().timestamp();

        let conn = self.conn.lock().expect("Storage mutex poisoned");
        conn.execute(
            "INSERT INTO projects (name, url, status, schema_version, analysis, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                name,
                url,
                ProjectStatus::Analyzed.as_str(),
                SCHEMA_VERSION,
                blob,
                now
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Created project {id} for {url}");
        Ok(id)
    }

    /// Gets a project with all of its stored records.
    ///
    /// # Returns
    ///
    /// Returns the project if found, None if not found
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails, or a stored record is
    /// malformed or was written by a different schema version
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, url, status, schema_version, analysis, funnel_data, email_sequence, created_at, updated_at
             FROM projects WHERE id = ?1",
        )?;
        let project_row: Option<ProjectRow> = stmt
            .query_row([id], |row| {
                Ok(ProjectRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                    status: row.get(3)?,
                    schema_version: row.get(4)?,
                    analysis: row.get(5)?,
                    funnel_data: row.get(6)?,
                    email_sequence: row.get(7)?,
                    created_at: row.get(8)?,
                    updated_at: row.get(9)?,
                })
            })
            .optional()
            .map_err(|e| anyhow!("Unable to fetch project row: {e}"))?;

        let Some(project_row) = project_row else {
            return Ok(None);
        };

        Ok(Some(project_row.try_into()?))
    }

    /// Lists all projects, oldest first, without their records.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, url, status, created_at, updated_at FROM projects ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        rows.map(|row| -> Result<ProjectSummary> {
            let (id, name, url, status, created_at, updated_at) = row?;
            Ok(ProjectSummary {
                id,
                name,
                url,
                status: status.parse()?,
                created_at: timestamp(created_at, "created_at")?,
                updated_at: timestamp(updated_at, "updated_at")?,
            })
        })
        .collect()
    }

    /// Stores the funnel of a project and moves it to `funnel_generated`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project doesn't exist, hasn't been analyzed,
    /// already has an email sequence, or database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn save_funnel(&self, id: i64, funnel: &Funnel) -> Result<()> {
        self.advance(
            id,
            ProjectStatus::FunnelGenerated,
            "UPDATE projects SET funnel_data = ?1, status = ?2, schema_version = ?3, updated_at = ?4 WHERE id = ?5",
            to_blob(funnel)?,
        )
    }

    /// Stores the email sequence of a project and moves it to `completed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project doesn't exist, has no funnel yet, or
    /// database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn save_email_sequence(&self, id: i64, sequence: &EmailSequence) -> Result<()> {
        self.advance(
            id,
            ProjectStatus::Completed,
            "UPDATE projects SET email_sequence = ?1, status = ?2, schema_version = ?3, updated_at = ?4 WHERE id = ?5",
            to_blob(sequence)?,
        )
    }

    fn advance(&self, id: i64, next: ProjectStatus, sql: &str, blob: String) -> Result<()> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let status: Option<String> = conn
            .query_row("SELECT status FROM projects WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(status) = status else {
            bail!("Project {id} not found");
        };
        let status: ProjectStatus = status.parse()?;
        if !status.can_advance_to(next) {
            bail!("Project {id} is {status} and cannot move to {next}");
        }

        conn.execute(
            sql,
            params![
                blob,
                next.as_str(),
                SCHEMA_VERSION,
                Utc::now().timestamp(),
                id
            ],
        )?;
        debug!("Project {id} moved from {status} to {next}");

        Ok(())
    }

    /// Removes a project.
    ///
    /// # Returns
    ///
    /// Returns `true` if a project was removed, `false` if there was none with this id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

fn to_blob<T: Serialize>(record: &T) -> Result<String> {
    serde_json::to_string(record).context("Unable to serialize project record")
}

fn from_blob<T: DeserializeOwned>(blob: Option<String>, column: &str) -> Result<Option<T>> {
    blob.filter(|blob| !blob.is_empty())
        .map(|blob| {
            serde_json::from_str(&blob).with_context(|| format!("Malformed {column} in database"))
        })
        .transpose()
}

fn timestamp(seconds: i64, column: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_secs(seconds)
        .with_context(|| format!("Unable to initialize {column} from database"))
}

/// Represents a project stored in the database
#[derive(Debug)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub status: String,
    pub schema_version: i64,
    pub analysis: Option<String>,
    pub funnel_data: Option<String>,
    pub email_sequence: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Represents domain Project
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub status: ProjectStatus,
    pub analysis: Option<Analysis>,
    pub funnel: Option<Funnel>,
    pub email_sequence: Option<EmailSequence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project listing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = anyhow::Error;

    fn try_from(project_row: ProjectRow) -> Result<Self> {
        if project_row.schema_version != SCHEMA_VERSION {
            bail!(
                "Project {} was stored with schema version {}, expected {SCHEMA_VERSION}",
                project_row.id,
                project_row.schema_version
            );
        }

        Ok(Project {
            id: project_row.id,
            name: project_row.name,
            url: project_row.url,
            status: project_row.status.parse()?,
            analysis: from_blob(project_row.analysis, "analysis")?,
            funnel: from_blob(project_row.funnel_data, "funnel_data")?,
            email_sequence: from_blob(project_row.email_sequence, "email_sequence")?,
            created_at: timestamp(project_row.created_at, "created_at")?,
            updated_at: timestamp(project_row.updated_at, "updated_at")?,
        })
    }
}
