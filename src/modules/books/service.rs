//! Book lifecycle operations and cursor pagination.

use std::sync::Arc;

use shelf_db::DbError;
use shelf_http::error::AppError;
use thiserror::Error;

use super::models::{Book, BookUpdate, NewBook};
use super::repository::BookRepository;

/// Message returned whenever a book id does not resolve.
pub const NOT_FOUND_MESSAGE: &str = "Book not found!";

#[derive(Error, Debug)]
pub enum BookError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => AppError::not_found(NOT_FOUND_MESSAGE),
            BookError::Store(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

/// Resource manager for books. Cheap to clone; clones share one repository.
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, new_book: NewBook) -> Result<Book, BookError> {
        let book = self.repo.insert(new_book)?;
        tracing::info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub fn get(&self, id: i64) -> Result<Book, BookError> {
        self.repo.get(id)?.ok_or(BookError::NotFound(id))
    }

    pub fn by_title(&self, title: &str) -> Result<Vec<Book>, BookError> {
        Ok(self.repo.filter_by_title(title, None)?)
    }

    pub fn all(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.repo.list()?)
    }

    /// List books titled `title`, resuming at `cursor`.
    ///
    /// Only the first `limit` matches are fetched before the cursor is
    /// looked up, so a cursor outside that window is ignored and the window
    /// is returned from its start.
    pub fn by_title_paginated(
        &self,
        title: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Book>, BookError> {
        let window = self.repo.filter_by_title(title, Some(limit))?;
        let page = paginate(window, cursor, limit);
        tracing::debug!(title, ?cursor, limit, returned = page.len(), "paginated title listing");
        Ok(page)
    }

    pub fn update(&self, update: BookUpdate) -> Result<Book, BookError> {
        let book = Book::from(update);
        if !self.repo.update(&book)? {
            return Err(BookError::NotFound(book.id));
        }
        tracing::info!(book_id = book.id, "book updated");
        Ok(book)
    }

    pub fn delete(&self, id: i64) -> Result<(), BookError> {
        if !self.repo.delete(id)? {
            return Err(BookError::NotFound(id));
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}

/// Start `window` at the book whose id equals `cursor`, keeping at most
/// `limit` entries. A cursor that matches nothing leaves the window as is.
fn paginate(window: Vec<Book>, cursor: Option<i64>, limit: usize) -> Vec<Book> {
    let start = cursor
        .and_then(|cursor| window.iter().position(|book| book.id == cursor))
        .unwrap_or(0);

    window.into_iter().skip(start).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::{SqliteBookRepository, CREATE_BOOKS};
    use shelf_db::Database;

    fn service() -> BookService {
        let db = Database::in_memory().unwrap();
        db.apply_migrations([("books", "001_init", CREATE_BOOKS)])
            .unwrap();
        BookService::new(Arc::new(SqliteBookRepository::new(db)))
    }

    fn seeded(title: &str, count: usize) -> BookService {
        let service = service();
        for n in 0..count {
            service
                .create(NewBook::new(title, format!("author-{}", n)))
                .unwrap();
        }
        service
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn create_then_list_returns_single_book() {
        let service = service();
        service.create(NewBook::new("T", "A")).unwrap();

        let all = service.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "T");
        assert_eq!(all[0].author, "A");
        assert_eq!(all[0].description, "");
        assert!(all[0].id > 0);
    }

    #[test]
    fn get_by_id_finds_created_book_only() {
        let service = service();
        let book = service.create(NewBook::new("T", "A")).unwrap();

        assert_eq!(service.get(book.id).unwrap(), book);
        assert!(matches!(service.get(book.id + 100), Err(BookError::NotFound(_))));
    }

    #[test]
    fn by_title_keeps_creation_order() {
        let service = service();
        let first = service.create(NewBook::new("T", "one")).unwrap();
        service.create(NewBook::new("Other", "two")).unwrap();
        let third = service.create(NewBook::new("T", "three")).unwrap();

        assert_eq!(ids(&service.by_title("T").unwrap()), vec![first.id, third.id]);
        assert!(service.by_title("missing").unwrap().is_empty());
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let service = service();
        let book = service.create(NewBook::new("T", "A")).unwrap();

        service
            .update(BookUpdate {
                id: book.id,
                title: "T2".to_string(),
                author: "A2".to_string(),
                description: "revised".to_string(),
            })
            .unwrap();

        let fetched = service.get(book.id).unwrap();
        assert_eq!(fetched.id, book.id);
        assert_eq!(fetched.title, "T2");
        assert_eq!(fetched.author, "A2");
        assert_eq!(fetched.description, "revised");
    }

    #[test]
    fn update_of_missing_book_is_not_found() {
        let service = service();
        let result = service.update(BookUpdate {
            id: 42,
            title: "T".to_string(),
            author: "A".to_string(),
            description: String::new(),
        });
        assert!(matches!(result, Err(BookError::NotFound(42))));
    }

    #[test]
    fn delete_removes_book() {
        let service = service();
        let book = service.create(NewBook::new("T", "A")).unwrap();

        service.delete(book.id).unwrap();

        assert!(matches!(service.get(book.id), Err(BookError::NotFound(_))));
        assert!(matches!(service.delete(book.id), Err(BookError::NotFound(_))));
    }

    #[test]
    fn cursor_inside_window_truncates() {
        let service = seeded("T", 5);
        let page = service.by_title_paginated("T", Some(3), 5).unwrap();
        assert_eq!(ids(&page), vec![3, 4, 5]);
    }

    #[test]
    fn cursor_outside_prefetched_window_is_ignored() {
        // Only ids 1 and 2 are fetched before the cursor lookup.
        let service = seeded("T", 5);
        let page = service.by_title_paginated("T", Some(3), 2).unwrap();
        assert_eq!(ids(&page), vec![1, 2]);
    }

    #[test]
    fn missing_cursor_returns_window_from_start() {
        let service = seeded("T", 5);
        assert_eq!(
            ids(&service.by_title_paginated("T", None, 3).unwrap()),
            vec![1, 2, 3]
        );
        assert_eq!(
            ids(&service.by_title_paginated("T", Some(99), 3).unwrap()),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn zero_limit_or_unknown_title_is_empty() {
        let service = seeded("T", 3);
        assert!(service.by_title_paginated("T", Some(1), 0).unwrap().is_empty());
        assert!(service.by_title_paginated("U", Some(1), 5).unwrap().is_empty());
    }

    #[test]
    fn not_found_maps_to_fixed_message() {
        let err: AppError = BookError::NotFound(7).into();
        match err {
            AppError::NotFound { message, .. } => assert_eq!(message, NOT_FOUND_MESSAGE),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
