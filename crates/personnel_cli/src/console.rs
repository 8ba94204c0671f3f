//! Interactive menu loop.
//!
//! # Responsibility
//! - Collect raw field strings, bind them through the form binder and call
//!   the record store.
//! - Present success or structured errors; never abort on a store failure.
//!
//! # Invariants
//! - End of input behaves like choosing Exit.

use personnel_core::form::employee_form::keys;
use personnel_core::{
    from_fields, manager_options, status_options, to_fields, to_row, DeletePolicy,
    EmployeeId, EmployeeRepository, EmployeeService, FieldMap, RepoError, DISPLAY_COLUMNS,
};
use std::io::{self, BufRead, Write};

const MENU: &str = "
Employee Management System
1. Add Employee
2. View All Employees
3. View Employee by ID
4. Update Employee
5. Delete Employee
6. List Managers
7. Exit";

/// Update answer that clears the current value instead of keeping it.
const CLEAR_TOKEN: &str = "-";

/// `(key, prompt)` pairs in form order.
const FORM_PROMPTS: [(&str, &str); 12] = [
    (keys::NAME, "Name"),
    (keys::EMAIL, "Email"),
    (keys::PHONE, "Phone"),
    (keys::ADDRESS, "Address"),
    (keys::DEPARTMENT, "Department"),
    (keys::JOB_TITLE, "Job title"),
    (keys::STATUS, "Status"),
    (keys::SALARY, "Salary"),
    (keys::BONUSES, "Bonuses"),
    (keys::BENEFITS, "Benefits"),
    (keys::DATE_OF_JOINING, "Date of joining (YYYY-MM-DD)"),
    (keys::MANAGER, "Manager"),
];

struct Console<'a, R: EmployeeRepository, I, O> {
    service: &'a EmployeeService<R>,
    input: I,
    output: O,
}

/// Runs the menu until Exit or end of input.
pub fn run<R, I, O>(service: &EmployeeService<R>, input: I, output: O) -> io::Result<()>
where
    R: EmployeeRepository,
    I: BufRead,
    O: Write,
{
    let mut console = Console {
        service,
        input,
        output,
    };
    console.run()
}

impl<R: EmployeeRepository, I: BufRead, O: Write> Console<'_, R, I, O> {
    fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Enter your choice (1-7)")? else {
                break;
            };
            match choice.as_str() {
                "1" => self.add()?,
                "2" => self.view_all()?,
                "3" => self.view_one()?,
                "4" => self.update()?,
                "5" => self.delete()?,
                "6" => self.list_managers()?,
                "7" => break,
                _ => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    fn add(&mut self) -> io::Result<()> {
        let Some(form) = self.collect_form(None)? else {
            return Ok(());
        };
        let fields = match from_fields(&form) {
            Ok(fields) => fields,
            Err(err) => return writeln!(self.output, "Invalid {}: {err}", err.field()),
        };
        match self.service.create(&fields) {
            Ok(id) => writeln!(self.output, "Employee added with id {id}"),
            Err(err) => self.report(&err),
        }
    }

    fn view_all(&mut self) -> io::Result<()> {
        let listing = self
            .service
            .list()
            .and_then(|items| Ok((items, self.service.list_manager_candidates()?)));
        let (items, managers) = match listing {
            Ok(listing) => listing,
            Err(err) => return self.report(&err),
        };
        if items.is_empty() {
            return writeln!(self.output, "No employees recorded.");
        }
        writeln!(self.output, "{}", DISPLAY_COLUMNS.join(" | "))?;
        for employee in &items {
            writeln!(self.output, "{}", to_row(employee, &managers).join(" | "))?;
        }
        Ok(())
    }

    fn view_one(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id("Employee ID")? else {
            return Ok(());
        };
        let lookup = self
            .service
            .get(id)
            .and_then(|employee| Ok((employee, self.service.list_manager_candidates()?)));
        match lookup {
            Ok((employee, managers)) => {
                for (key, value) in to_fields(&employee, &managers) {
                    writeln!(self.output, "{key}: {value}")?;
                }
                Ok(())
            }
            Err(err) => self.report(&err),
        }
    }

    fn update(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id("Employee ID to update")? else {
            return Ok(());
        };
        let current = match self
            .service
            .get(id)
            .and_then(|employee| Ok(to_fields(&employee, &self.service.list_manager_candidates()?)))
        {
            Ok(current) => current,
            Err(err) => return self.report(&err),
        };
        let Some(form) = self.collect_form(Some(&current))? else {
            return Ok(());
        };
        let fields = match from_fields(&form) {
            Ok(fields) => fields,
            Err(err) => return writeln!(self.output, "Invalid {}: {err}", err.field()),
        };
        match self.service.update(id, &fields) {
            Ok(()) => writeln!(self.output, "Employee {id} updated"),
            Err(err) => self.report(&err),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id("Employee ID to delete")? else {
            return Ok(());
        };
        let reports = match self.service.list_reports(id) {
            Ok(reports) => reports.len(),
            Err(err) => return self.report(&err),
        };
        let mut policy = DeletePolicy::Orphan;
        if reports > 0 {
            let answer = self.prompt(&format!(
                "{reports} employee(s) report to {id}. Clear their manager? [y/N]"
            ))?;
            if matches!(answer.as_deref(), Some("y") | Some("Y")) {
                policy = DeletePolicy::DetachReports;
            }
        }
        match self.service.delete_with_policy(id, policy) {
            Ok(()) => writeln!(self.output, "Employee {id} deleted"),
            Err(err) => self.report(&err),
        }
    }

    fn list_managers(&mut self) -> io::Result<()> {
        match self.service.list_manager_candidates() {
            Ok(candidates) => {
                for option in manager_options(&candidates) {
                    writeln!(self.output, "{option}")?;
                }
                Ok(())
            }
            Err(err) => self.report(&err),
        }
    }

    /// Prompts for every form field. With `current`, a blank answer keeps
    /// the current value and `-` clears it. Returns `None` on end of input.
    fn collect_form(&mut self, current: Option<&FieldMap>) -> io::Result<Option<FieldMap>> {
        let mut form = FieldMap::new();
        for (key, label) in FORM_PROMPTS {
            let hint = match key {
                k if k == keys::STATUS => format!(" {:?}", status_options()),
                k if k == keys::MANAGER => " (None, or an id)".to_string(),
                _ => String::new(),
            };
            let existing = current.and_then(|map| map.get(key)).cloned();
            let prompt = match &existing {
                Some(value) => format!("{label}{hint} [{value}, {CLEAR_TOKEN} to clear]"),
                None => format!("{label}{hint}"),
            };
            let Some(answer) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            let value = match existing {
                Some(value) if answer.is_empty() => value,
                Some(_) if answer == CLEAR_TOKEN => String::new(),
                _ => answer,
            };
            form.insert(key.to_string(), value);
        }
        Ok(Some(form))
    }

    fn prompt_id(&mut self, label: &str) -> io::Result<Option<EmployeeId>> {
        let Some(answer) = self.prompt(label)? else {
            return Ok(None);
        };
        match answer.parse::<EmployeeId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.output, "`{answer}` is not a valid employee id")?;
                Ok(None)
            }
        }
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report(&mut self, err: &RepoError) -> io::Result<()> {
        writeln!(self.output, "Error ({:?}): {err}", err.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use personnel_core::{EmployeeService, SqliteEmployeeRepository, StoreSession};
    use std::io::Cursor;

    fn drive(session: &StoreSession, script: &str) -> String {
        let service = EmployeeService::new(SqliteEmployeeRepository::try_new(session).unwrap());
        let mut output = Vec::new();
        run(&service, Cursor::new(script.to_string()), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn add_script(name: &str, salary: &str, manager: &str) -> String {
        format!("1\n{name}\n\n\n\n\n\nFull-time\n{salary}\n\n\n2024-01-15\n{manager}\n")
    }

    #[test]
    fn add_then_list_shows_row() {
        let session = StoreSession::open_in_memory();
        let script = format!("{}2\n7\n", add_script("Ana", "5000", "None"));
        let output = drive(&session, &script);

        assert!(output.contains("Employee added with id 1"));
        assert!(output.contains("1 | Ana |"));
        assert!(output.contains("5000.00"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn invalid_salary_is_reported_per_field() {
        let session = StoreSession::open_in_memory();
        let output = drive(&session, &add_script("Ana", "abc", "None"));
        assert!(output.contains("Invalid salary"));
        assert!(!output.contains("Employee added"));
    }

    #[test]
    fn update_keeps_blank_answers_and_delete_reports_missing() {
        let session = StoreSession::open_in_memory();
        let script = format!(
            "{}4\n1\nAna Maria\n\n\n\n\n\n\n6000\n\n\n\n\n3\n1\n5\n1\n5\n1\n",
            add_script("Ana", "5000", "None")
        );
        let output = drive(&session, &script);

        assert!(output.contains("Employee 1 updated"));
        assert!(output.contains("name: Ana Maria"));
        assert!(output.contains("salary: 6000.00"));
        assert!(output.contains("date_of_joining: 2024-01-15"));
        assert!(output.contains("Employee 1 deleted"));
        assert!(output.contains("Error (NotFound): employee not found: 1"));
    }

    #[test]
    fn update_dash_answer_clears_optional_field() {
        let session = StoreSession::open_in_memory();
        let add = "1\nAna\nana@example.com\n\n\nOps\n\nFull-time\n5000\n\n\n2024-01-15\nNone\n";
        let script = format!("{add}4\n1\n\n-\n\n\n-\n\n\n\n\n\n\n\n3\n1\n7\n");
        let output = drive(&session, &script);

        assert!(output.contains("Employee 1 updated"));
        assert!(output.contains("email: \n"));
        assert!(output.contains("department: \n"));
        assert!(output.contains("name: Ana\n"));
        assert!(output.contains("status: Full-time\n"));
    }

    #[test]
    fn unavailable_store_reports_without_exiting() {
        let session = StoreSession::unavailable("no database");
        let output = drive(&session, "2\n7\n");
        assert!(output.contains("Error (StoreUnavailable)"));
        assert!(output.contains("Goodbye!"));
    }
}
