//! Employee domain model.
//!
//! # Responsibility
//! - Define the canonical personnel record and its mutable field set.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `salary` and `bonuses` are non-negative and fit `decimal(10,2)`.
//! - `name` is non-blank.
//! - Optional text fields use the empty string for "unset".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned surrogate key of an employee row.
pub type EmployeeId = i64;

/// Largest amount representable by a `decimal(10,2)` column.
pub const MAX_MONEY_UNITS: i64 = 9_999_999_999;
/// Fractional digits kept for money columns.
pub const MONEY_SCALE: u32 = 2;

/// Employment contract kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contractor")]
    Contractor,
}

impl EmploymentStatus {
    /// All statuses in selection-list order.
    pub const ALL: [EmploymentStatus; 3] = [Self::FullTime, Self::PartTime, Self::Contractor];

    /// Display and storage label.
    pub fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Contractor => "Contractor",
        }
    }
}

impl Display for EmploymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmploymentStatus {
    type Err = EmployeeValidationError;

    /// Accepts the canonical labels case-insensitively, with `_`, `-` or a
    /// space as the separator (`full_time`, `Full time`, `FULL-TIME`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "full-time" => Ok(Self::FullTime),
            "part-time" => Ok(Self::PartTime),
            "contractor" => Ok(Self::Contractor),
            _ => Err(EmployeeValidationError::UnknownStatus(value.trim().to_string())),
        }
    }
}

/// Every mutable attribute of an employee.
///
/// Used as-is for create (`NewEmployee`) and as the full replacement for
/// update; there is no partial patch shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub department: String,
    pub job_title: String,
    pub status: Option<EmploymentStatus>,
    pub salary: Decimal,
    pub bonuses: Decimal,
    pub benefits: String,
    pub date_of_joining: NaiveDate,
    pub manager_id: Option<EmployeeId>,
}

/// Input shape for `create`.
pub type NewEmployee = EmployeeFields;

impl EmployeeFields {
    /// Creates a record with the required attributes set and everything
    /// else empty, zero bonuses and no manager.
    pub fn new(name: impl Into<String>, salary: Decimal, date_of_joining: NaiveDate) -> Self {
        Self {
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            department: String::new(),
            job_title: String::new(),
            status: None,
            salary,
            bonuses: Decimal::ZERO,
            benefits: String::new(),
            date_of_joining,
            manager_id: None,
        }
    }

    /// Checks field-level invariants.
    ///
    /// Manager existence is a store concern and is not checked here.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EmployeeValidationError::BlankName);
        }
        validate_money("salary", self.salary)?;
        validate_money("bonuses", self.bonuses)?;
        Ok(())
    }
}

/// A persisted employee: store identity plus its current field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    #[serde(flatten)]
    pub fields: EmployeeFields,
}

impl Employee {
    pub fn manager_id(&self) -> Option<EmployeeId> {
        self.fields.manager_id
    }
}

/// `(id, name)` projection used to populate a manager selection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerCandidate {
    pub id: EmployeeId,
    pub name: String,
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeValidationError {
    BlankName,
    /// A required form field was empty.
    Missing { field: &'static str },
    NotANumber { field: &'static str, value: String },
    InvalidDate { value: String },
    InvalidManager { value: String },
    NegativeAmount { field: &'static str },
    TooManyDecimals { field: &'static str },
    AmountOutOfRange { field: &'static str },
    UnknownStatus(String),
}

impl EmployeeValidationError {
    /// Name of the offending field, for field-level UI messages.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankName => "name",
            Self::Missing { field } | Self::NotANumber { field, .. } => *field,
            Self::InvalidDate { .. } => "date_of_joining",
            Self::InvalidManager { .. } => "manager",
            Self::NegativeAmount { field }
            | Self::TooManyDecimals { field }
            | Self::AmountOutOfRange { field } => *field,
            Self::UnknownStatus(_) => "status",
        }
    }
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::Missing { field } => write!(f, "{field} is required"),
            Self::NotANumber { field, value } => {
                write!(f, "{field} must be a number, got `{value}`")
            }
            Self::InvalidDate { value } => {
                write!(f, "date of joining must use YYYY-MM-DD, got `{value}`")
            }
            Self::InvalidManager { value } => {
                write!(f, "manager selection `{value}` does not name an employee id")
            }
            Self::NegativeAmount { field } => write!(f, "{field} must not be negative"),
            Self::TooManyDecimals { field } => {
                write!(f, "{field} must have at most {MONEY_SCALE} decimal places")
            }
            Self::AmountOutOfRange { field } => {
                write!(f, "{field} exceeds the maximum of 99999999.99")
            }
            Self::UnknownStatus(value) => write!(
                f,
                "unknown employment status `{value}`; expected Full-time|Part-time|Contractor"
            ),
        }
    }
}

impl Error for EmployeeValidationError {}

fn validate_money(field: &'static str, amount: Decimal) -> Result<(), EmployeeValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EmployeeValidationError::NegativeAmount { field });
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(EmployeeValidationError::TooManyDecimals { field });
    }
    if amount > Decimal::new(MAX_MONEY_UNITS, MONEY_SCALE) {
        return Err(EmployeeValidationError::AmountOutOfRange { field });
    }
    Ok(())
}

/// Renders money in its canonical two-decimal storage/display form.
pub fn format_money(amount: Decimal) -> String {
    let mut canonical = amount.round_dp(MONEY_SCALE);
    canonical.rescale(MONEY_SCALE);
    canonical.to_string()
}
