//! Loan renewal form

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::book_instance::BookInstance;

/// Date offered by default when a librarian opens the renewal form
pub const PROPOSED_RENEWAL_WEEKS: i64 = 3;

/// Furthest a loan can be extended, counted from today
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Accepted input format of the renewal date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidDate {
    #[error("This field is required.")]
    Missing,
    #[error("Enter a valid date.")]
    Malformed,
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Renewal form submitted by a librarian.
///
/// The date is kept as submitted so that an unparseable value comes back
/// with an inline error like any other invalid date.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RenewBookForm {
    /// Enter a date between now and 4 weeks (default 3), as YYYY-MM-DD
    #[serde(default)]
    #[schema(example = "2024-03-12")]
    pub renewal_date: String,
}

impl From<NaiveDate> for RenewBookForm {
    fn from(date: NaiveDate) -> Self {
        Self {
            renewal_date: date.format(DATE_FORMAT).to_string(),
        }
    }
}

impl RenewBookForm {
    /// Form pre-filled with today + 3 weeks
    pub fn initial(today: NaiveDate) -> Self {
        Self::from(today + Duration::weeks(PROPOSED_RENEWAL_WEEKS))
    }

    /// Validated renewal date: between today and today + 4 weeks, both included
    pub fn clean_renewal_date(&self, today: NaiveDate) -> Result<NaiveDate, InvalidDate> {
        let raw = self.renewal_date.trim();
        if raw.is_empty() {
            return Err(InvalidDate::Missing);
        }
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| InvalidDate::Malformed)?;

        if date < today {
            return Err(InvalidDate::InPast);
        }
        if date > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
            return Err(InvalidDate::TooFarAhead);
        }
        Ok(date)
    }
}

/// Form state sent back to the client: current value plus inline errors
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenewalFormState {
    pub renewal_date: String,
    /// Field name to error messages; empty when the form is valid
    pub errors: BTreeMap<String, Vec<String>>,
}

impl RenewalFormState {
    pub fn unbound(form: RenewBookForm) -> Self {
        Self {
            renewal_date: form.renewal_date,
            errors: BTreeMap::new(),
        }
    }

    pub fn rejected(form: RenewBookForm, error: InvalidDate) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert("renewal_date".to_string(), vec![error.to_string()]);
        Self {
            renewal_date: form.renewal_date,
            errors,
        }
    }
}

/// Context of the renewal page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalPage {
    pub form: RenewalFormState,
    pub bookinst: BookInstance,
}

/// Result of a renewal submission
#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    Renewed(BookInstance),
    Rejected(RenewalPage),
}
