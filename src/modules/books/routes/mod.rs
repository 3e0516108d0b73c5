//! HTTP handlers for the Books module.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bookstack_http::{ApiResponse, AppError, AppResult};
use serde_json::{Map, Value};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::{Book, BookPatch, NewBook};
use super::repository::BookRepository;
use super::validation::{validate_new_book, Violation};

const NOT_FOUND: &str = "Book not found!";

#[derive(OpenApi)]
#[openapi(tags((name = "Books", description = "Book catalogue operations")))]
struct BooksApi;

/// Routes served by the Books module, bound to `books`.
pub fn router(books: BookRepository) -> OpenApiRouter {
    OpenApiRouter::with_openapi(BooksApi::openapi())
        .routes(routes!(add_book))
        .routes(routes!(get_books))
        .routes(routes!(get_book))
        .routes(routes!(edit_book))
        .routes(routes!(delete_book))
        .with_state(books)
}

fn validation_error(violations: Vec<Violation>) -> AppError {
    let details = violations
        .into_iter()
        .filter_map(|violation| serde_json::to_value(violation).ok())
        .collect();
    AppError::validation(details, "Validation error")
}

/// Add a new book
///
/// Validates the body against the book schema before storing it.
#[utoipa::path(
    post,
    path = "/addBook",
    operation_id = "addBook",
    tag = "Books",
    request_body(content = NewBook, description = "The book details to add"),
    responses(
        (status = 201, description = "Book successfully added", body = ApiResponse<Book>),
        (status = 400, description = "Validation error", body = ApiResponse<Vec<Violation>>),
        (status = 500, description = "Server error")
    )
)]
pub async fn add_book(
    State(books): State<BookRepository>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let candidate = match payload {
        Ok(Json(candidate)) => candidate,
        // Bodies without a JSON content type read as an empty object.
        Err(JsonRejection::MissingJsonContentType(_)) => Value::Object(Map::new()),
        Err(rejection) => return Err(rejection.into()),
    };
    let new_book = validate_new_book(&candidate).map_err(validation_error)?;

    let book = books.create(new_book).await.map_err(AppError::internal)?;
    tracing::info!(book_id = book.id(), "book added");

    Ok((StatusCode::CREATED, Json(ApiResponse::new("book added", book))))
}

/// Get all books
///
/// An empty collection is answered with 400, not an empty list.
#[utoipa::path(
    get,
    path = "/books",
    operation_id = "getBooks",
    tag = "Books",
    responses(
        (status = 200, description = "Books fetched successfully", body = ApiResponse<Vec<Book>>),
        (status = 400, description = "No books found"),
        (status = 500, description = "Server error")
    )
)]
pub async fn get_books(
    State(books): State<BookRepository>,
) -> AppResult<Json<ApiResponse<Vec<Book>>>> {
    let all = books.list().await.map_err(AppError::internal)?;
    if all.is_empty() {
        return Err(AppError::not_found(NOT_FOUND));
    }

    Ok(Json(ApiResponse::new("Books fetched successfully!", all)))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/book/{id}",
    operation_id = "getBook",
    tag = "Books",
    params(("id" = String, Path, description = "The ID of the book to fetch")),
    responses(
        (status = 200, description = "Book fetched successfully", body = ApiResponse<Book>),
        (status = 400, description = "Book not found"),
        (status = 500, description = "Server error")
    )
)]
pub async fn get_book(
    State(books): State<BookRepository>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = books
        .get(&id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(ApiResponse::new("Book fetched successfully!", book)))
}

/// Edit a book by ID
///
/// The given fields are stored as-is; no schema check is applied.
#[utoipa::path(
    patch,
    path = "/updateBook/{id}",
    operation_id = "editBook",
    tag = "Books",
    params(("id" = String, Path, description = "The ID of the book to update")),
    request_body(content = BookPatch, description = "The data to update the book with"),
    responses(
        (status = 200, description = "Book updated successfully", body = ApiResponse<Book>),
        (status = 400, description = "Book not found"),
        (status = 500, description = "Server error")
    )
)]
pub async fn edit_book(
    State(books): State<BookRepository>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let patch = match payload {
        Ok(Json(patch)) => patch,
        Err(JsonRejection::MissingJsonContentType(_)) => BookPatch::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let book = books
        .update(&id, patch)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(book_id = book.id(), "book updated");

    Ok(Json(ApiResponse::new("Book updated successfully!", book)))
}

/// Delete a book by ID
///
/// Responds with the state the book had before removal.
#[utoipa::path(
    delete,
    path = "/deleteBook/{id}",
    operation_id = "deleteBook",
    tag = "Books",
    params(("id" = String, Path, description = "The ID of the book to delete")),
    responses(
        (status = 200, description = "Book deleted successfully", body = ApiResponse<Book>),
        (status = 400, description = "Book not found"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn delete_book(
    State(books): State<BookRepository>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = books
        .delete(&id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(book_id = book.id(), "book deleted");

    Ok(Json(ApiResponse::new("Book deleted successfully!", book)))
}
