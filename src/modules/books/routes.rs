//! HTTP handlers for the books module.
//!
//! Paths are relative to the module mount point. The same annotations feed
//! both the axum router and the OpenAPI fragment.

use axum::{extract::State, http::StatusCode, Json};
use shelf_http::{
    error::{AppError, ErrorBody},
    extract::{ValidJson, ValidPath, ValidQuery},
};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::{Book, BookUpdate, DeleteResult, NewBook, PageQuery, TitleResults};
use super::service::BookService;

#[derive(OpenApi)]
#[openapi(tags((name = "Books", description = "Book resource management")))]
struct BooksApi;

/// Router for every books endpoint, with its OpenAPI description.
pub fn router() -> OpenApiRouter<BookService> {
    OpenApiRouter::with_openapi(BooksApi::openapi())
        .routes(routes!(list_books, create_book, update_book))
        .routes(routes!(get_book, delete_book))
        .routes(routes!(books_by_title))
        .routes(routes!(books_by_title_paginated))
}

/// List every book in creation order
#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    )
)]
async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.all()?))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 422, description = "Missing or invalid fields", body = ErrorBody),
    )
)]
async fn create_book(
    State(service): State<BookService>,
    ValidJson(new_book): ValidJson<NewBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = service.create(new_book)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace every field of an existing book
#[utoipa::path(
    put,
    path = "/",
    tag = "Books",
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found", body = ErrorBody),
        (status = 422, description = "Missing or invalid fields", body = ErrorBody),
    )
)]
async fn update_book(
    State(service): State<BookService>,
    ValidJson(update): ValidJson<BookUpdate>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.update(update)?))
}

/// Fetch one book by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found", body = ErrorBody),
    )
)]
async fn get_book(
    State(service): State<BookService>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(id)?))
}

/// Delete one book by id
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = DeleteResult),
        (status = 404, description = "Book not found", body = ErrorBody),
    )
)]
async fn delete_book(
    State(service): State<BookService>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<DeleteResult>, AppError> {
    service.delete(id)?;
    Ok(Json(DeleteResult { success: true }))
}

/// All books with exactly this title
#[utoipa::path(
    get,
    path = "/title/{title}",
    tag = "Books",
    params(("title" = String, Path, description = "Exact, case-sensitive title")),
    responses(
        (status = 200, description = "Matching books", body = TitleResults),
    )
)]
async fn books_by_title(
    State(service): State<BookService>,
    ValidPath(title): ValidPath<String>,
) -> Result<Json<TitleResults>, AppError> {
    let results = service.by_title(&title)?;
    Ok(Json(TitleResults { results }))
}

/// Books with this title, resuming at a cursor
#[utoipa::path(
    get,
    path = "/titles/{title}",
    tag = "Books",
    params(
        ("title" = String, Path, description = "Exact, case-sensitive title"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "One page of matching books", body = Vec<Book>),
        (status = 422, description = "Non-integer cursor or limit", body = ErrorBody),
    )
)]
async fn books_by_title_paginated(
    State(service): State<BookService>,
    ValidPath(title): ValidPath<String>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = service.by_title_paginated(&title, page.cursor, page.limit)?;
    Ok(Json(books))
}
