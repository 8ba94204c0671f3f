//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `employees` table.
//! - Enforce manager references (existence, no self reference, no cycles).
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `EmployeeFields::validate()` before SQL mutations.
//! - Every mutating call runs in its own immediate transaction and commits
//!   before returning.
//! - Read paths reject undecodable rows instead of masking them; dangling
//!   manager references are not undecodable and are returned as stored.

use crate::db::migrations::latest_version;
use crate::db::{DbError, StoreSession};
use crate::model::employee::{
    format_money, Employee, EmployeeFields, EmployeeId, EmployeeValidationError,
    EmploymentStatus, ManagerCandidate,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    phone,
    address,
    department,
    job_title,
    status,
    salary,
    bonuses,
    benefits,
    date_of_joining,
    manager_id
FROM employees";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Manager-reference integrity failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The referenced manager row does not exist.
    ManagerNotFound(EmployeeId),
    /// A record named itself as its manager.
    SelfReference(EmployeeId),
    /// The new manager already reports (transitively) to the record.
    ManagerCycle {
        employee_id: EmployeeId,
        manager_id: EmployeeId,
    },
    /// Delete refused because other records still report to the target.
    HasReports {
        employee_id: EmployeeId,
        reports: usize,
    },
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ManagerNotFound(id) => write!(f, "manager not found: {id}"),
            Self::SelfReference(id) => write!(f, "employee {id} cannot manage itself"),
            Self::ManagerCycle {
                employee_id,
                manager_id,
            } => write!(
                f,
                "manager {manager_id} already reports to employee {employee_id}"
            ),
            Self::HasReports {
                employee_id,
                reports,
            } => write!(
                f,
                "employee {employee_id} still has {reports} direct report(s)"
            ),
        }
    }
}

impl Error for ReferenceError {}

/// Caller-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Reference,
    NotFound,
    StoreUnavailable,
    CorruptData,
}

/// Repository error for employee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EmployeeValidationError),
    Reference(ReferenceError),
    NotFound(EmployeeId),
    Db(DbError),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl RepoError {
    /// Classifies this error for the boundary layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Reference(_) => ErrorKind::Reference,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Db(_) | Self::UninitializedConnection { .. } => ErrorKind::StoreUnavailable,
            Self::InvalidData(_) => ErrorKind::CorruptData,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{}: {err}", err.field()),
            Self::Reference(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "employee not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "employee repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Reference(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReferenceError> for RepoError {
    fn from(value: ReferenceError) -> Self {
        Self::Reference(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// What happens to direct reports when their manager is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Delete only the row; reports keep the now dangling manager id.
    #[default]
    Orphan,
    /// Clear `manager_id` on direct reports in the same transaction.
    DetachReports,
    /// Refuse with `ReferenceError::HasReports` while reports exist.
    RestrictIfReports,
}

/// Repository interface for employee CRUD operations.
pub trait EmployeeRepository {
    fn create_employee(&self, fields: &EmployeeFields) -> RepoResult<EmployeeId>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Returns every row in ascending id order.
    fn list_employees(&self) -> RepoResult<Vec<Employee>>;
    fn update_employee(&self, id: EmployeeId, fields: &EmployeeFields) -> RepoResult<()>;
    fn delete_employee(&self, id: EmployeeId, policy: DeletePolicy) -> RepoResult<()>;
    fn list_manager_candidates(&self) -> RepoResult<Vec<ManagerCandidate>>;
    fn list_reports(&self, manager_id: EmployeeId) -> RepoResult<Vec<Employee>>;
    fn count_employees(&self) -> RepoResult<u64>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'session> {
    session: &'session StoreSession,
}

impl<'session> SqliteEmployeeRepository<'session> {
    /// Creates a repository over a session.
    ///
    /// A sentinel session is accepted; its operations fail with
    /// `StoreUnavailable` when invoked. A live connection must be migrated to
    /// the latest schema version.
    pub fn try_new(session: &'session StoreSession) -> RepoResult<Self> {
        if let Ok(conn) = session.connection() {
            ensure_connection_ready(conn)?;
        }
        Ok(Self { session })
    }

    fn conn(&self) -> RepoResult<&'session Connection> {
        Ok(self.session.connection()?)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, fields: &EmployeeFields) -> RepoResult<EmployeeId> {
        fields.validate()?;
        let conn = self.conn()?;

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if let Some(manager_id) = fields.manager_id {
            ensure_manager_exists(&tx, manager_id)?;
        }

        tx.execute(
            "INSERT INTO employees (
                name,
                email,
                phone,
                address,
                department,
                job_title,
                status,
                salary,
                bonuses,
                benefits,
                date_of_joining,
                manager_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                fields.name.as_str(),
                empty_to_null(&fields.email),
                empty_to_null(&fields.phone),
                empty_to_null(&fields.address),
                empty_to_null(&fields.department),
                empty_to_null(&fields.job_title),
                fields.status.map(EmploymentStatus::label),
                format_money(fields.salary),
                format_money(fields.bonuses),
                empty_to_null(&fields.benefits),
                fields.date_of_joining.format(DATE_FORMAT).to_string(),
                fields.manager_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }

    fn update_employee(&self, id: EmployeeId, fields: &EmployeeFields) -> RepoResult<()> {
        fields.validate()?;
        let conn = self.conn()?;

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if !employee_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }
        if let Some(manager_id) = fields.manager_id {
            if manager_id == id {
                return Err(ReferenceError::SelfReference(id).into());
            }
            ensure_manager_exists(&tx, manager_id)?;
            if manager_chain_reaches(&tx, manager_id, id)? {
                return Err(ReferenceError::ManagerCycle {
                    employee_id: id,
                    manager_id,
                }
                .into());
            }
        }

        tx.execute(
            "UPDATE employees
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                address = ?4,
                department = ?5,
                job_title = ?6,
                status = ?7,
                salary = ?8,
                bonuses = ?9,
                benefits = ?10,
                date_of_joining = ?11,
                manager_id = ?12
             WHERE id = ?13;",
            params![
                fields.name.as_str(),
                empty_to_null(&fields.email),
                empty_to_null(&fields.phone),
                empty_to_null(&fields.address),
                empty_to_null(&fields.department),
                empty_to_null(&fields.job_title),
                fields.status.map(EmploymentStatus::label),
                format_money(fields.salary),
                format_money(fields.bonuses),
                empty_to_null(&fields.benefits),
                fields.date_of_joining.format(DATE_FORMAT).to_string(),
                fields.manager_id,
                id,
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn delete_employee(&self, id: EmployeeId, policy: DeletePolicy) -> RepoResult<()> {
        let conn = self.conn()?;
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if !employee_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }

        match policy {
            DeletePolicy::Orphan => {}
            DeletePolicy::DetachReports => {
                tx.execute(
                    "UPDATE employees SET manager_id = NULL WHERE manager_id = ?1;",
                    [id],
                )?;
            }
            DeletePolicy::RestrictIfReports => {
                let reports: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM employees WHERE manager_id = ?1 AND id <> ?1;",
                    [id],
                    |row| row.get(0),
                )?;
                if reports > 0 {
                    return Err(ReferenceError::HasReports {
                        employee_id: id,
                        reports: reports as usize,
                    }
                    .into());
                }
            }
        }

        tx.execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        tx.commit()?;

        Ok(())
    }

    fn list_manager_candidates(&self) -> RepoResult<Vec<ManagerCandidate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM employees ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next()? {
            candidates.push(ManagerCandidate {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(candidates)
    }

    fn list_reports(&self, manager_id: EmployeeId) -> RepoResult<Vec<Employee>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} WHERE manager_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([manager_id])?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next()? {
            reports.push(parse_employee_row(row)?);
        }
        Ok(reports)
    }

    fn count_employees(&self) -> RepoResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn employee_exists(conn: &Connection, id: EmployeeId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_manager_exists(conn: &Connection, manager_id: EmployeeId) -> RepoResult<()> {
    if employee_exists(conn, manager_id)? {
        Ok(())
    } else {
        Err(ReferenceError::ManagerNotFound(manager_id).into())
    }
}

/// Walks the manager chain upward from `start` and reports whether it
/// reaches `target`. Dangling or already cyclic chains terminate the walk.
fn manager_chain_reaches(
    conn: &Connection,
    start: EmployeeId,
    target: EmployeeId,
) -> RepoResult<bool> {
    let mut visited = HashSet::new();
    let mut cursor = Some(start);
    while let Some(current) = cursor {
        if current == target {
            return Ok(true);
        }
        if !visited.insert(current) {
            return Ok(false);
        }
        cursor = conn
            .query_row(
                "SELECT manager_id FROM employees WHERE id = ?1;",
                [current],
                |row| row.get::<_, Option<EmployeeId>>(0),
            )
            .optional()?
            .flatten();
    }
    Ok(false)
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;

    let status = match row.get::<_, Option<String>>("status")? {
        Some(value) => Some(EmploymentStatus::from_str(&value).map_err(|_| {
            RepoError::InvalidData(format!("invalid status `{value}` in employees.status"))
        })?),
        None => None,
    };

    let date_text: String = row.get("date_of_joining")?;
    let date_of_joining = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{date_text}` in employees.date_of_joining"
        ))
    })?;

    let fields = EmployeeFields {
        name: row.get("name")?,
        email: null_to_empty(row.get("email")?),
        phone: null_to_empty(row.get("phone")?),
        address: null_to_empty(row.get("address")?),
        department: null_to_empty(row.get("department")?),
        job_title: null_to_empty(row.get("job_title")?),
        status,
        salary: parse_money(row, "salary")?,
        bonuses: parse_money(row, "bonuses")?,
        benefits: null_to_empty(row.get("benefits")?),
        date_of_joining,
        manager_id: row.get("manager_id")?,
    };
    fields.validate().map_err(|err| {
        RepoError::InvalidData(format!("employee {id} failed validation: {err}"))
    })?;

    Ok(Employee { id, fields })
}

fn parse_money(row: &Row<'_>, column: &'static str) -> RepoResult<Decimal> {
    let text: String = row.get(column)?;
    Decimal::from_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid amount `{text}` in employees.{column}"))
    })
}

fn empty_to_null(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn null_to_empty(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
