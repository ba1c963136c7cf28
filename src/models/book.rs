//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, book_instance::BookInstance, genre::Genre};

/// Book (a title, not a physical copy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Author id; `None` once the author has been deleted
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    /// Ids of the genres the book belongs to
    pub genre_ids: Vec<i32>,
}

/// Book with its author, genres and physical copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookInstance>,
}

/// Book form, used for create and update
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub author: Option<i32>,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: String,
    /// Genre ids
    #[serde(default)]
    pub genre: Vec<i32>,
}

/// Title search query
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TitleQuery {
    pub title: String,
}
