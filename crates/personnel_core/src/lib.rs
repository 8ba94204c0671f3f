//! Core domain logic for the personnel record manager.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, DbLocation};
pub use db::{with_session, DbError, StoreSession};
pub use form::employee_form::{
    from_fields, manager_options, status_options, to_fields, to_row, FieldMap, DISPLAY_COLUMNS,
    NO_MANAGER_LABEL,
};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::employee::{
    Employee, EmployeeFields, EmployeeId, EmployeeValidationError, EmploymentStatus,
    ManagerCandidate, NewEmployee,
};
pub use repo::employee_repo::{
    DeletePolicy, EmployeeRepository, ErrorKind, ReferenceError, RepoError, RepoResult,
    SqliteEmployeeRepository,
};
pub use service::employee_service::EmployeeService;

/// Opens the session described by `config` with sentinel semantics.
pub fn open_session(config: &AppConfig) -> StoreSession {
    match config.db_path() {
        Some(path) => StoreSession::open(path),
        None => StoreSession::open_in_memory(),
    }
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
