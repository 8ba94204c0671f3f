use chrono::NaiveDate;
use personnel_core::{
    DeletePolicy, EmployeeFields, EmployeeId, EmployeeService, EmploymentStatus, ReferenceError,
    RepoError, SqliteEmployeeRepository, StoreSession,
};
use rust_decimal::Decimal;

fn record(name: &str, manager_id: Option<EmployeeId>) -> EmployeeFields {
    let mut fields = EmployeeFields::new(
        name,
        Decimal::new(4000, 0),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
    );
    fields.manager_id = manager_id;
    fields
}

#[test]
fn delete_manager_leaves_dangling_reference_by_default() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let mut ana = EmployeeFields::new(
        "Ana",
        Decimal::new(5000, 0),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    );
    ana.status = Some(EmploymentStatus::FullTime);
    let ana_id = service.create(&ana).unwrap();
    assert_eq!(ana_id, 1);

    let bo_id = service.create(&record("Bo", Some(1))).unwrap();
    assert_eq!(bo_id, 2);
    assert_eq!(service.get(2).unwrap().manager_id(), Some(1));

    service.delete(1).unwrap();
    assert!(matches!(service.get(1), Err(RepoError::NotFound(1))));
    assert_eq!(service.get(2).unwrap().manager_id(), Some(1));
}

#[test]
fn writes_with_dangling_manager_are_rejected() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let bo = service.create(&record("Bo", Some(ana))).unwrap();
    service.delete(ana).unwrap();

    let err = service.update(bo, &record("Bo", Some(ana))).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Reference(ReferenceError::ManagerNotFound(id)) if id == ana
    ));

    service.update(bo, &record("Bo", None)).unwrap();
    assert_eq!(service.get(bo).unwrap().manager_id(), None);
}

#[test]
fn detach_policy_clears_reports() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let bo = service.create(&record("Bo", Some(ana))).unwrap();
    let cy = service.create(&record("Cy", Some(ana))).unwrap();

    service
        .delete_with_policy(ana, DeletePolicy::DetachReports)
        .unwrap();

    assert_eq!(service.get(bo).unwrap().manager_id(), None);
    assert_eq!(service.get(cy).unwrap().manager_id(), None);
    assert!(service.list_reports(ana).unwrap().is_empty());
}

#[test]
fn restrict_policy_refuses_while_reports_exist() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let bo = service.create(&record("Bo", Some(ana))).unwrap();

    let err = service
        .delete_with_policy(ana, DeletePolicy::RestrictIfReports)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Reference(ReferenceError::HasReports { reports: 1, .. })
    ));
    assert!(service.get(ana).is_ok());

    service.delete(bo).unwrap();
    service
        .delete_with_policy(ana, DeletePolicy::RestrictIfReports)
        .unwrap();
    assert_eq!(service.count().unwrap(), 0);
}

#[test]
fn failed_detach_delete_rolls_back() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let bo = service.create(&record("Bo", Some(ana))).unwrap();
    service.delete(ana).unwrap();

    let err = service
        .delete_with_policy(ana, DeletePolicy::DetachReports)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(service.get(bo).unwrap().manager_id(), Some(ana));
}

#[test]
fn restrict_delete_of_missing_manager_is_not_found() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let bo = service.create(&record("Bo", Some(ana))).unwrap();
    service.delete(ana).unwrap();

    let err = service
        .delete_with_policy(ana, DeletePolicy::RestrictIfReports)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ana));
    assert_eq!(err.kind(), personnel_core::ErrorKind::NotFound);
    assert_eq!(service.get(bo).unwrap().manager_id(), Some(ana));
}

#[test]
fn self_reference_is_rejected() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let err = service.update(ana, &record("Ana", Some(ana))).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Reference(ReferenceError::SelfReference(id)) if id == ana
    ));
}

#[test]
fn cycles_are_rejected_at_write_time() {
    let session = StoreSession::open_in_memory();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&session).unwrap());

    let ana = service.create(&record("Ana", None)).unwrap();
    let bo = service.create(&record("Bo", Some(ana))).unwrap();
    let cy = service.create(&record("Cy", Some(bo))).unwrap();

    let err = service.update(ana, &record("Ana", Some(cy))).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Reference(ReferenceError::ManagerCycle { employee_id, manager_id })
            if employee_id == ana && manager_id == cy
    ));
    assert_eq!(service.get(ana).unwrap().manager_id(), None);

    // Re-pointing within the chain without closing a loop is fine.
    service.update(cy, &record("Cy", Some(ana))).unwrap();
    let reports: Vec<_> = service
        .list_reports(ana)
        .unwrap()
        .into_iter()
        .map(|employee| employee.id)
        .collect();
    assert_eq!(reports, vec![bo, cy]);
}
