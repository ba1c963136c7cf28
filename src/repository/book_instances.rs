//! Book instances (physical copies) repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, BorrowedInstance, CreateBookInstance, LoanStatus},
};

use super::map_reference_error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstancesStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance>;

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;

    async fn create(&self, book_id: i32, data: &CreateBookInstance) -> AppResult<BookInstance>;

    /// On-loan copies ordered by due date, optionally limited to one borrower,
    /// with the total count
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<BorrowedInstance>, i64)>;

    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;

    async fn count(&self) -> AppResult<i64>;

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookInstancesStore for BookInstancesRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "SELECT id, book_id, imprint, due_back, status, borrower_id FROM book_instances WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let copies = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT id, book_id, imprint, due_back, status, borrower_id
            FROM book_instances
            WHERE book_id = $1
            ORDER BY due_back NULLS LAST, id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    async fn create(&self, book_id: i32, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let copy = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, book_id, imprint, due_back, status, borrower_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_reference_error(e, "book or borrower"))?;
        Ok(copy)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<BorrowedInstance>, i64)> {
        let copies = sqlx::query_as::<_, BorrowedInstance>(
            r#"
            SELECT bi.id, bi.book_id, b.title, bi.imprint, bi.due_back, bi.status,
                   bi.borrower_id, u.username AS borrower_username,
                   COALESCE(bi.due_back < CURRENT_DATE, FALSE) AS is_overdue
            FROM book_instances bi
            LEFT JOIN books b ON b.id = bi.book_id
            LEFT JOIN users u ON u.id = bi.borrower_id
            WHERE bi.status = $1
              AND ($2::int IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC, bi.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_instances
            WHERE status = $1 AND ($2::int IS NULL OR borrower_id = $2)
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((copies, total))
    }

    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances SET due_back = $1 WHERE id = $2
            RETURNING id, book_id, imprint, due_back, status, borrower_id
            "#,
        )
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
