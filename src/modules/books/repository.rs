//! Storage access for books.

use rusqlite::{params, OptionalExtension, Row};
use shelf_db::{Database, DbError};

use super::models::{Book, NewBook};

/// Schema for the books table.
pub const CREATE_BOOKS: &str = r#"
    CREATE TABLE books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX idx_books_title ON books(title);
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, author, description FROM books";

/// Persistence operations over the books table.
///
/// Every listing returns books in creation order.
pub trait BookRepository: Send + Sync {
    fn insert(&self, book: NewBook) -> Result<Book, DbError>;

    fn get(&self, id: i64) -> Result<Option<Book>, DbError>;

    fn list(&self) -> Result<Vec<Book>, DbError>;

    /// Books whose title equals `title` exactly, at most `limit` of them.
    fn filter_by_title(&self, title: &str, limit: Option<usize>) -> Result<Vec<Book>, DbError>;

    /// Overwrite the stored row with `book`. Returns `false` if no row has its id.
    fn update(&self, book: &Book) -> Result<bool, DbError>;

    /// Returns `false` if no row had this id.
    fn delete(&self, id: i64) -> Result<bool, DbError>;
}

/// [`BookRepository`] backed by the embedded SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    db: Database,
}

impl SqliteBookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

impl BookRepository for SqliteBookRepository {
    fn insert(&self, book: NewBook) -> Result<Book, DbError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO books (title, author, description) VALUES (?1, ?2, ?3)",
                params![book.title, book.author, book.description],
            )?;
            Ok(Book {
                id: conn.last_insert_rowid(),
                title: book.title,
                author: book.author,
                description: book.description,
            })
        })
    }

    fn get(&self, id: i64) -> Result<Option<Book>, DbError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_book,
            )
            .optional()
        })
    }

    fn list(&self) -> Result<Vec<Book>, DbError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
            let books = stmt
                .query_map([], Self::row_to_book)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(books)
        })
    }

    fn filter_by_title(&self, title: &str, limit: Option<usize>) -> Result<Vec<Book>, DbError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE title = ?1 ORDER BY id LIMIT ?2",
                SELECT_COLUMNS
            ))?;
            let books = stmt
                .query_map(params![title, limit], Self::row_to_book)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(books)
        })
    }

    fn update(&self, book: &Book) -> Result<bool, DbError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE books SET title = ?1, author = ?2, description = ?3 WHERE id = ?4",
                params![book.title, book.author, book.description, book.id],
            )
        })?;
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool, DbError> {
        let removed = self
            .db
            .with_conn(|conn| conn.execute("DELETE FROM books WHERE id = ?1", params![id]))?;
        Ok(removed > 0)
    }
}
