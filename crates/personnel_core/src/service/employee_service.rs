//! Employee record store use-case service.
//!
//! # Responsibility
//! - Provide the record store contract (create/get/list/update/delete) to
//!   UI and CLI callers.
//! - Translate repository `Option` reads into `NotFound` errors.
//! - Emit metadata-only diagnostics per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Logged events carry ids, counts and error kinds only; never names,
//!   contact details or amounts.

use crate::model::employee::{Employee, EmployeeFields, EmployeeId, ManagerCandidate, NewEmployee};
use crate::repo::employee_repo::{DeletePolicy, EmployeeRepository, RepoError, RepoResult};
use log::{debug, info, warn};
use std::time::Instant;

/// Use-case service wrapper for employee records.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a new record and returns its store-assigned id.
    ///
    /// # Errors
    /// - `Validation` for blank name or out-of-range money.
    /// - `Reference` when `manager_id` names no existing record.
    /// - `Db` when the session is unavailable or the write fails.
    pub fn create(&self, record: &NewEmployee) -> RepoResult<EmployeeId> {
        let started_at = Instant::now();
        let result = self.repo.create_employee(record);
        match &result {
            Ok(id) => info!(
                "event=employee_create module=store status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("employee_create", None, err),
        }
        result
    }

    /// Point lookup by id.
    pub fn get(&self, id: EmployeeId) -> RepoResult<Employee> {
        let result = self
            .repo
            .get_employee(id)
            .and_then(|found| found.ok_or(RepoError::NotFound(id)));
        if let Err(err) = &result {
            log_failure("employee_get", Some(id), err);
        }
        result
    }

    /// Returns every record.
    ///
    /// Callers needing a specific order must sort; the SQLite repository
    /// happens to return ascending id order.
    pub fn list(&self) -> RepoResult<Vec<Employee>> {
        let result = self.repo.list_employees();
        match &result {
            Ok(items) => debug!(
                "event=employee_list module=store status=ok count={}",
                items.len()
            ),
            Err(err) => log_failure("employee_list", None, err),
        }
        result
    }

    /// Replaces every mutable field of an existing record.
    pub fn update(&self, id: EmployeeId, fields: &EmployeeFields) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.update_employee(id, fields);
        match &result {
            Ok(()) => info!(
                "event=employee_update module=store status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("employee_update", Some(id), err),
        }
        result
    }

    /// Deletes a record permanently, leaving reports' manager ids dangling.
    pub fn delete(&self, id: EmployeeId) -> RepoResult<()> {
        self.delete_with_policy(id, DeletePolicy::Orphan)
    }

    /// Deletes a record using an explicit policy for its direct reports.
    pub fn delete_with_policy(&self, id: EmployeeId, policy: DeletePolicy) -> RepoResult<()> {
        let result = self.repo.delete_employee(id, policy);
        match &result {
            Ok(()) => info!(
                "event=employee_delete module=store status=ok id={id} policy={policy:?}"
            ),
            Err(err) => log_failure("employee_delete", Some(id), err),
        }
        result
    }

    /// `(id, name)` pairs for a manager selection control. Excludes nobody.
    pub fn list_manager_candidates(&self) -> RepoResult<Vec<ManagerCandidate>> {
        let result = self.repo.list_manager_candidates();
        if let Err(err) = &result {
            log_failure("manager_candidates", None, err);
        }
        result
    }

    /// Direct reports of `manager_id`.
    pub fn list_reports(&self, manager_id: EmployeeId) -> RepoResult<Vec<Employee>> {
        let result = self.repo.list_reports(manager_id);
        if let Err(err) = &result {
            log_failure("employee_reports", Some(manager_id), err);
        }
        result
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count_employees()
    }
}

fn log_failure(event: &str, id: Option<EmployeeId>, err: &RepoError) {
    let id = id.map_or_else(|| "-".to_string(), |value| value.to_string());
    warn!(
        "event={event} module=store status=error id={id} error_kind={:?}",
        err.kind()
    );
}
