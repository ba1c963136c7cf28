//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Shown as "Died" in the author forms
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First", the form used in listings
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Author form, used for create and update.
///
/// Only these fields are accepted; anything else in the payload is rejected.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

/// Initial values of an empty author form
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthorDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorDraft {
    /// Values pre-filled when a librarian opens the create form
    pub fn initial() -> Self {
        Self {
            first_name: None,
            last_name: None,
            date_of_birth: None,
            date_of_death: NaiveDate::from_ymd_opt(2016, 12, 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let author = Author {
            id: 1,
            first_name: "Ursula".into(),
            last_name: "Le Guin".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_eq!(author.display_name(), "Le Guin, Ursula");
    }

    #[test]
    fn test_form_rejects_unknown_fields() {
        let res: Result<AuthorForm, _> = serde_json::from_value(serde_json::json!({
            "first_name": "Ursula",
            "last_name": "Le Guin",
            "id": 42
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_form_length_limits() {
        let form = AuthorForm {
            first_name: "x".repeat(101),
            last_name: "Le Guin".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(form.validate().is_err());

        let form = AuthorForm {
            first_name: String::new(),
            ..form
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_initial_date_of_death() {
        let draft = AuthorDraft::initial();
        assert_eq!(draft.date_of_death, NaiveDate::from_ymd_opt(2016, 12, 10));
        assert!(draft.first_name.is_none());
    }
}
