use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Store-assigned identifier, increasing in creation order
    pub id: i64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Free-form description, empty when not provided
    pub description: String,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewBook {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: String::new(),
        }
    }
}

/// Request model for replacing every mutable field of a book.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookUpdate {
    /// Identifier of the book to update
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl From<BookUpdate> for Book {
    fn from(update: BookUpdate) -> Self {
        Self {
            id: update.id,
            title: update.title,
            author: update.author,
            description: update.description,
        }
    }
}

/// Books sharing an exact title.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TitleResults {
    pub results: Vec<Book>,
}

/// Outcome of a delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResult {
    pub success: bool,
}

/// Query parameters for the paginated title listing.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Id of the book to resume from (inclusive)
    pub cursor: Option<i64>,
    /// Maximum number of books to return
    pub limit: usize,
}
