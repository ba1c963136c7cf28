//! Books repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookForm},
};

use super::map_reference_error;

const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.author_id, b.summary, b.isbn,
    ARRAY(SELECT bg.genre_id FROM book_genres bg WHERE bg.book_id = b.id ORDER BY bg.genre_id) AS genre_ids
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksStore: Send + Sync {
    /// One page of books ordered by title, with the total count
    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Book>, i64)>;

    /// Books whose title contains `fragment`, case-insensitively
    async fn search_title(&self, fragment: &str, limit: i64) -> AppResult<Vec<Book>>;

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn create(&self, form: &BookForm) -> AppResult<Book>;

    async fn update(&self, id: i32, form: &BookForm) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;

    async fn count_in_genre(&self, genre_id: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn replace_genres(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(genre_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_reference_error(e, "genre"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl BooksStore for BooksRepository {
    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Book>, i64)> {
        let query = format!(
            "SELECT {} FROM books b ORDER BY b.title, b.id LIMIT $1 OFFSET $2",
            BOOK_COLUMNS
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = self.count().await?;
        Ok((books, total))
    }

    async fn search_title(&self, fragment: &str, limit: i64) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT {} FROM books b WHERE b.title ILIKE $1 ORDER BY b.title, b.id LIMIT $2",
            BOOK_COLUMNS
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(format!("%{}%", escape_like(fragment)))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT {} FROM books b WHERE b.author_id = $1 ORDER BY b.title, b.id",
            BOOK_COLUMNS
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books b WHERE b.id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&form.title)
        .bind(form.author)
        .bind(&form.summary)
        .bind(&form.isbn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_reference_error(e, "author"))?;

        Self::replace_genres(&mut tx, id, &form.genre).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn update(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4
            WHERE id = $5
            RETURNING id
            "#,
        )
        .bind(&form.title)
        .bind(form.author)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_reference_error(e, "author"))?;

        if updated.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Self::replace_genres(&mut tx, id, &form.genre).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_in_genre(&self, genre_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT book_id) FROM book_genres WHERE genre_id = $1",
        )
        .bind(genre_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
