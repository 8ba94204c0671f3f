//! Employee form binder.
//!
//! # Responsibility
//! - Render typed employee records into flat string maps and display rows.
//! - Coerce user-entered field strings back into `EmployeeFields`.
//!
//! # Invariants
//! - Dates are exchanged as `YYYY-MM-DD`.
//! - Money is rendered with exactly two decimals.
//! - A null manager is rendered as `None` and parsed back to `None`.
//! - Manager labels are `"<id> - <name>"`; only the id part is parsed.

use crate::model::employee::{
    format_money, Employee, EmployeeFields, EmployeeId, EmployeeValidationError,
    EmploymentStatus, ManagerCandidate,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Flat all-string representation exchanged with the presentation layer.
pub type FieldMap = BTreeMap<String, String>;

/// Sentinel label for "no manager".
pub const NO_MANAGER_LABEL: &str = "None";

const DATE_FORMAT: &str = "%Y-%m-%d";
const MANAGER_LABEL_SEPARATOR: &str = " - ";

/// Field keys used in `FieldMap`.
pub mod keys {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const ADDRESS: &str = "address";
    pub const DEPARTMENT: &str = "department";
    pub const JOB_TITLE: &str = "job_title";
    pub const STATUS: &str = "status";
    pub const SALARY: &str = "salary";
    pub const BONUSES: &str = "bonuses";
    pub const BENEFITS: &str = "benefits";
    pub const DATE_OF_JOINING: &str = "date_of_joining";
    pub const MANAGER: &str = "manager";
}

/// Column headers for table views, in `to_row` order.
pub const DISPLAY_COLUMNS: [&str; 11] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Department",
    "Job Title",
    "Status",
    "Salary",
    "Bonuses",
    "Date of Joining",
    "Manager",
];

/// Renders a stored record into a flat field map.
///
/// `managers` resolves manager names for the composite label; an id missing
/// from it (dangling reference) renders as the bare id.
pub fn to_fields(record: &Employee, managers: &[ManagerCandidate]) -> FieldMap {
    let fields = &record.fields;
    let mut map = FieldMap::new();
    map.insert(keys::ID.to_string(), record.id.to_string());
    map.insert(keys::NAME.to_string(), fields.name.clone());
    map.insert(keys::EMAIL.to_string(), fields.email.clone());
    map.insert(keys::PHONE.to_string(), fields.phone.clone());
    map.insert(keys::ADDRESS.to_string(), fields.address.clone());
    map.insert(keys::DEPARTMENT.to_string(), fields.department.clone());
    map.insert(keys::JOB_TITLE.to_string(), fields.job_title.clone());
    map.insert(keys::STATUS.to_string(), status_label(fields.status).to_string());
    map.insert(keys::SALARY.to_string(), format_money(fields.salary));
    map.insert(keys::BONUSES.to_string(), format_money(fields.bonuses));
    map.insert(keys::BENEFITS.to_string(), fields.benefits.clone());
    map.insert(
        keys::DATE_OF_JOINING.to_string(),
        fields.date_of_joining.format(DATE_FORMAT).to_string(),
    );
    map.insert(
        keys::MANAGER.to_string(),
        manager_label(fields.manager_id, managers),
    );
    map
}

/// Coerces raw form strings into a typed field set.
///
/// Missing keys are treated as empty input. Optional free text is trimmed;
/// an empty bonus field defaults to zero.
///
/// # Errors
/// - `Missing` for an empty name, salary or date.
/// - `NotANumber`, `InvalidDate`, `InvalidManager`, `UnknownStatus` for
///   uncoercible text.
/// - Any `EmployeeFields::validate` failure (negative or oversized money).
pub fn from_fields(fields: &FieldMap) -> Result<EmployeeFields, EmployeeValidationError> {
    let name = text(fields, keys::NAME);
    if name.is_empty() {
        return Err(EmployeeValidationError::Missing { field: keys::NAME });
    }

    let salary = match text(fields, keys::SALARY) {
        value if value.is_empty() => {
            return Err(EmployeeValidationError::Missing {
                field: keys::SALARY,
            })
        }
        value => parse_money(keys::SALARY, &value)?,
    };
    let bonuses = match text(fields, keys::BONUSES) {
        value if value.is_empty() => Decimal::ZERO,
        value => parse_money(keys::BONUSES, &value)?,
    };

    let date_text = text(fields, keys::DATE_OF_JOINING);
    if date_text.is_empty() {
        return Err(EmployeeValidationError::Missing {
            field: keys::DATE_OF_JOINING,
        });
    }
    let date_of_joining = NaiveDate::parse_from_str(&date_text, DATE_FORMAT)
        .map_err(|_| EmployeeValidationError::InvalidDate { value: date_text })?;

    let status = match text(fields, keys::STATUS) {
        value if value.is_empty() => None,
        value => Some(EmploymentStatus::from_str(&value)?),
    };

    let record = EmployeeFields {
        name,
        email: text(fields, keys::EMAIL),
        phone: text(fields, keys::PHONE),
        address: text(fields, keys::ADDRESS),
        department: text(fields, keys::DEPARTMENT),
        job_title: text(fields, keys::JOB_TITLE),
        status,
        salary,
        bonuses,
        benefits: text(fields, keys::BENEFITS),
        date_of_joining,
        manager_id: parse_manager_label(&text(fields, keys::MANAGER))?,
    };
    record.validate()?;
    Ok(record)
}

/// Renders one display row in `DISPLAY_COLUMNS` order.
pub fn to_row(record: &Employee, managers: &[ManagerCandidate]) -> Vec<String> {
    let fields = &record.fields;
    vec![
        record.id.to_string(),
        fields.name.clone(),
        fields.email.clone(),
        fields.phone.clone(),
        fields.department.clone(),
        fields.job_title.clone(),
        status_label(fields.status).to_string(),
        format_money(fields.salary),
        format_money(fields.bonuses),
        fields.date_of_joining.format(DATE_FORMAT).to_string(),
        manager_label(fields.manager_id, managers),
    ]
}

/// Selection-list entries for a manager control: `None` first, then one
/// composite label per candidate.
pub fn manager_options(candidates: &[ManagerCandidate]) -> Vec<String> {
    std::iter::once(NO_MANAGER_LABEL.to_string())
        .chain(candidates.iter().map(candidate_label))
        .collect()
}

/// Selection-list entries for the status control, empty entry first.
pub fn status_options() -> Vec<String> {
    std::iter::once(String::new())
        .chain(
            EmploymentStatus::ALL
                .iter()
                .map(|status| status.label().to_string()),
        )
        .collect()
}

/// Parses a manager selection label into an id.
///
/// Accepts `None`, the empty string, `"<id>"` and `"<id> - <name>"`.
pub fn parse_manager_label(label: &str) -> Result<Option<EmployeeId>, EmployeeValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_MANAGER_LABEL) {
        return Ok(None);
    }

    let id_part = trimmed
        .split_once('-')
        .map_or(trimmed, |(id, _)| id)
        .trim();
    match id_part.parse::<EmployeeId>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(EmployeeValidationError::InvalidManager {
            value: trimmed.to_string(),
        }),
    }
}

fn manager_label(manager_id: Option<EmployeeId>, managers: &[ManagerCandidate]) -> String {
    match manager_id {
        None => NO_MANAGER_LABEL.to_string(),
        Some(id) => managers
            .iter()
            .find(|candidate| candidate.id == id)
            .map_or_else(|| id.to_string(), candidate_label),
    }
}

fn candidate_label(candidate: &ManagerCandidate) -> String {
    format!(
        "{}{MANAGER_LABEL_SEPARATOR}{}",
        candidate.id, candidate.name
    )
}

fn status_label(status: Option<EmploymentStatus>) -> &'static str {
    status.map_or("", EmploymentStatus::label)
}

fn text(fields: &FieldMap, key: &str) -> String {
    fields
        .get(key)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn parse_money(field: &'static str, value: &str) -> Result<Decimal, EmployeeValidationError> {
    Decimal::from_str(value).map_err(|_| EmployeeValidationError::NotANumber {
        field,
        value: value.to_string(),
    })
}
