//! Loan service: borrowed listings and librarian renewals

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::BorrowedInstance,
        pagination::{Page, PageQuery, PageRequest},
        renewal::{RenewBookForm, RenewalFormState, RenewalOutcome, RenewalPage},
    },
    repository::BookInstancesStore,
};

pub const LOANS_PER_PAGE: i64 = 10;

#[derive(Clone)]
pub struct LoansService {
    instances: Arc<dyn BookInstancesStore>,
}

impl LoansService {
    pub fn new(instances: Arc<dyn BookInstancesStore>) -> Self {
        Self { instances }
    }

    /// Copies on loan to one user, soonest due first
    pub async fn borrowed_by_user(
        &self,
        user_id: i32,
        query: PageQuery,
    ) -> AppResult<Page<BorrowedInstance>> {
        self.on_loan(Some(user_id), query).await
    }

    /// Every copy on loan, soonest due first
    pub async fn borrowed_by_all(&self, query: PageQuery) -> AppResult<Page<BorrowedInstance>> {
        self.on_loan(None, query).await
    }

    async fn on_loan(
        &self,
        borrower_id: Option<i32>,
        query: PageQuery,
    ) -> AppResult<Page<BorrowedInstance>> {
        let request = PageRequest::new(query, LOANS_PER_PAGE)?;
        let (copies, total) = self
            .instances
            .list_on_loan(borrower_id, request.offset(), request.limit())
            .await?;
        Page::new(copies, total, request)
    }

    /// Renewal form for a copy, pre-filled three weeks from `today`
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalPage> {
        let bookinst = self.instances.get_by_id(id).await?;
        Ok(RenewalPage {
            form: RenewalFormState::unbound(RenewBookForm::initial(today)),
            bookinst,
        })
    }

    /// Apply a submitted renewal form.
    ///
    /// The copy is only written when the date passes validation; otherwise the
    /// form comes back with its error and the copy unchanged.
    pub async fn renew(
        &self,
        id: Uuid,
        form: RenewBookForm,
        today: NaiveDate,
    ) -> AppResult<RenewalOutcome> {
        let bookinst = self.instances.get_by_id(id).await?;

        match form.clean_renewal_date(today) {
            Ok(renewal_date) => {
                let renewed = self.instances.update_due_back(id, renewal_date).await?;
                tracing::info!(
                    copy_id = %id,
                    previous_due_back = ?bookinst.due_back,
                    due_back = %renewal_date,
                    "Loan renewed"
                );
                Ok(RenewalOutcome::Renewed(renewed))
            }
            Err(error) => {
                tracing::debug!(copy_id = %id, proposed = %form.renewal_date, "Renewal rejected: {}", error);
                Ok(RenewalOutcome::Rejected(RenewalPage {
                    form: RenewalFormState::rejected(form, error),
                    bookinst,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::book_instance::{BookInstance, LoanStatus},
        repository::book_instances::MockBookInstancesStore,
    };
    use chrono::Duration;
    use mockall::predicate::{always, eq};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn copy(id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book_id: Some(1),
            imprint: "Ace Books, 1969".into(),
            due_back: NaiveDate::from_ymd_opt(2024, 5, 3),
            status: LoanStatus::OnLoan,
            borrower_id: Some(2),
        }
    }

    fn borrowed(due_back: NaiveDate) -> BorrowedInstance {
        BorrowedInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            title: Some("The Left Hand of Darkness".into()),
            imprint: "Ace Books, 1969".into(),
            due_back: Some(due_back),
            status: LoanStatus::OnLoan,
            borrower_id: Some(2),
            borrower_username: Some("reader".into()),
            is_overdue: false,
        }
    }

    fn submit(days: i64) -> RenewBookForm {
        RenewBookForm::from(today() + Duration::days(days))
    }

    #[tokio::test]
    async fn test_renew_three_weeks_updates_due_back() {
        let id = Uuid::new_v4();
        let target = today() + Duration::days(21);
        let mut store = MockBookInstancesStore::new();
        store.expect_get_by_id().with(eq(id)).returning(|id| Ok(copy(id)));
        store
            .expect_update_due_back()
            .with(eq(id), eq(target))
            .times(1)
            .returning(|id, due_back| {
                Ok(BookInstance {
                    due_back: Some(due_back),
                    ..copy(id)
                })
            });

        let outcome = LoansService::new(Arc::new(store))
            .renew(id, submit(21), today())
            .await
            .unwrap();
        match outcome {
            RenewalOutcome::Renewed(copy) => assert_eq!(copy.due_back, Some(target)),
            other => panic!("expected renewal, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_renew_out_of_range_does_not_write() {
        for days in [-1, 29, 30] {
            let id = Uuid::new_v4();
            let mut store = MockBookInstancesStore::new();
            store.expect_get_by_id().returning(|id| Ok(copy(id)));
            store.expect_update_due_back().never();

            let outcome = LoansService::new(Arc::new(store))
                .renew(id, submit(days), today())
                .await
                .unwrap();
            match outcome {
                RenewalOutcome::Rejected(page) => {
                    assert_eq!(page.form.renewal_date, (today() + Duration::days(days)).to_string());
                    assert_eq!(page.form.errors["renewal_date"].len(), 1);
                    assert_eq!(page.bookinst.due_back, copy(id).due_back);
                }
                other => panic!("expected rejection for {days} days, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_renew_unparseable_date_returns_form() {
        let id = Uuid::new_v4();
        let mut store = MockBookInstancesStore::new();
        store.expect_get_by_id().returning(|id| Ok(copy(id)));
        store.expect_update_due_back().never();

        let form = RenewBookForm {
            renewal_date: "2024-02-30".into(),
        };
        match LoansService::new(Arc::new(store)).renew(id, form, today()).await.unwrap() {
            RenewalOutcome::Rejected(page) => {
                assert_eq!(page.form.renewal_date, "2024-02-30");
                assert_eq!(page.form.errors["renewal_date"], vec!["Enter a valid date.".to_string()]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_renew_unknown_copy_is_not_found() {
        let mut store = MockBookInstancesStore::new();
        store
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Book instance {} not found", id))));
        store.expect_update_due_back().never();

        let res = LoansService::new(Arc::new(store))
            .renew(Uuid::new_v4(), submit(7), today())
            .await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_renewal_form_proposes_three_weeks() {
        let id = Uuid::new_v4();
        let mut store = MockBookInstancesStore::new();
        store.expect_get_by_id().returning(|id| Ok(copy(id)));

        let page = LoansService::new(Arc::new(store))
            .renewal_form(id, today())
            .await
            .unwrap();
        assert_eq!(page.form.renewal_date, "2024-05-22");
        assert!(page.form.errors.is_empty());
        assert_eq!(page.bookinst.id, id);
    }

    #[tokio::test]
    async fn test_borrowed_by_user_filters_on_borrower() {
        let mut store = MockBookInstancesStore::new();
        let first = today();
        let second = today() + Duration::days(3);
        store
            .expect_list_on_loan()
            .with(eq(Some(2)), eq(0), eq(LOANS_PER_PAGE))
            .returning(move |_, _, _| Ok((vec![borrowed(first), borrowed(second)], 2)));

        let page = LoansService::new(Arc::new(store))
            .borrowed_by_user(2, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
        assert!(!page.is_paginated);
    }

    #[tokio::test]
    async fn test_borrowed_page_offset_uses_loan_page_size() {
        let mut store = MockBookInstancesStore::new();
        store
            .expect_list_on_loan()
            .with(eq(Some(2)), eq(LOANS_PER_PAGE), eq(LOANS_PER_PAGE))
            .times(1)
            .returning(|_, _, _| Ok((vec![], 11)));

        let page = LoansService::new(Arc::new(store))
            .borrowed_by_user(2, PageQuery { page: Some(2) })
            .await
            .unwrap();
        assert_eq!(page.num_pages, 2);
    }

    #[tokio::test]
    async fn test_borrowed_by_all_has_no_borrower_filter() {
        let mut store = MockBookInstancesStore::new();
        store
            .expect_list_on_loan()
            .with(eq(None), always(), always())
            .returning(|_, _, _| Ok((vec![], 0)));

        let page = LoansService::new(Arc::new(store))
            .borrowed_by_all(PageQuery::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }
}
