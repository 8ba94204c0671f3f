//! Form binding between typed records and the string-only display layer.
//!
//! # Responsibility
//! - Centralize text coercion so the store stays free of presentation
//!   concerns.

pub mod employee_form;
