//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrow_records, categories, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "1.0.0",
        description = "Personal book library REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Categories
        categories::list_categories,
        categories::create_category,
        // Borrow records
        borrow_records::list_borrow_records,
        borrow_records::get_borrow_record,
        borrow_records::create_borrow_record,
        borrow_records::update_borrow_record,
        borrow_records::borrow_book,
        borrow_records::return_book,
        // Users
        users::list_users,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookFilter,
            books::MessageResponse,
            // Categories
            crate::models::category::Category,
            crate::models::category::CategoryOnBook,
            crate::models::category::BookInCategory,
            crate::models::category::CategoryDetails,
            crate::models::category::CreateCategory,
            // Borrow records
            crate::models::borrow_record::BorrowRecord,
            crate::models::borrow_record::BorrowStatus,
            crate::models::borrow_record::BorrowRecordDetails,
            crate::models::borrow_record::CreateBorrowRecord,
            crate::models::borrow_record::UpdateBorrowRecord,
            crate::models::borrow_record::BorrowBook,
            // Users
            crate::models::user::User,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "categories", description = "Book categories"),
        (name = "borrow-records", description = "Borrow records and the borrow/return workflow"),
        (name = "users", description = "Library users")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/books/{id}/borrow"));
        assert!(doc.paths.paths.contains_key("/borrow-records/{id}/return"));
        assert_eq!(doc.info.title, "Bookshelf API");
    }
}
