//! Catalog service: index summary, books, authors and copies

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail, AuthorDraft, AuthorForm},
        book::{Book, BookDetail, BookForm},
        book_instance::{BookInstance, CreateBookInstance, LoanStatus},
        genre::Genre,
        pagination::{Page, PageQuery, PageRequest},
    },
    repository::{AuthorsStore, BookInstancesStore, BooksStore, GenresStore, Repository},
};

pub const BOOKS_PER_PAGE: i64 = 10;
pub const AUTHORS_PER_PAGE: i64 = 10;
/// Cap on title search results
pub const TITLE_SEARCH_LIMIT: i64 = 5;

/// Catalog-wide counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Books in the featured genre
    pub num_books_romans: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    authors: Arc<dyn AuthorsStore>,
    books: Arc<dyn BooksStore>,
    genres: Arc<dyn GenresStore>,
    instances: Arc<dyn BookInstancesStore>,
    featured_genre_id: i32,
}

impl CatalogService {
    pub fn new(repository: &Repository, featured_genre_id: i32) -> Self {
        Self {
            authors: repository.authors.clone(),
            books: repository.books.clone(),
            genres: repository.genres.clone(),
            instances: repository.instances.clone(),
            featured_genre_id,
        }
    }

    /// Counts for the index page
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            num_books: self.books.count().await?,
            num_instances: self.instances.count().await?,
            num_instances_available: self
                .instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.authors.count().await?,
            num_books_romans: self.books.count_in_genre(self.featured_genre_id).await?,
        })
    }

    // Books

    pub async fn list_books(&self, query: PageQuery) -> AppResult<Page<Book>> {
        let request = PageRequest::new(query, BOOKS_PER_PAGE)?;
        let (books, total) = self.books.list(request.offset(), request.limit()).await?;
        Page::new(books, total, request)
    }

    /// Up to five books whose title contains `fragment`
    pub async fn search_books(&self, fragment: &str) -> AppResult<Vec<Book>> {
        self.books.search_title(fragment.trim(), TITLE_SEARCH_LIMIT).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.books.get_by_id(id).await?;
        let author = match book.author_id {
            Some(author_id) => Some(self.authors.get_by_id(author_id).await?),
            None => None,
        };
        let genres = self.genres.list_for_book(id).await?;
        let copies = self.instances.list_for_book(id).await?;

        Ok(BookDetail {
            book,
            author,
            genres,
            copies,
        })
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        form.validate()?;
        let book = self.books.create(&form).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Book> {
        form.validate()?;
        let book = self.books.update(id, &form).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    /// Register a new physical copy of a book
    pub async fn add_copy(&self, book_id: i32, data: CreateBookInstance) -> AppResult<BookInstance> {
        data.check()?;
        self.books.get_by_id(book_id).await?;
        let copy = self.instances.create(book_id, &data).await?;
        tracing::info!(book_id, copy_id = %copy.id, "Book copy added");
        Ok(copy)
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.genres.list().await
    }

    // Authors

    pub async fn list_authors(&self, query: PageQuery) -> AppResult<Page<Author>> {
        let request = PageRequest::new(query, AUTHORS_PER_PAGE)?;
        let (authors, total) = self.authors.list(request.offset(), request.limit()).await?;
        Page::new(authors, total, request)
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.authors.get_by_id(id).await?;
        let books = self.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub fn author_draft(&self) -> AuthorDraft {
        AuthorDraft::initial()
    }

    pub async fn create_author(&self, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.authors.create(&form).await?;
        tracing::info!(author_id = author.id, name = %author.display_name(), "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.authors.update(id, &form).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }
}
