//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lectern API",
        version = "1.0.0",
        description = "Library Lending System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::search_books,
        books::update_book,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::deactivate_user,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::SearchBooks,
            books::SearchResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserWithLoans,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanSummary,
            crate::models::loan::LoanDetails,
            crate::models::loan::UserLoan,
            crate::models::loan::LoanHistoryEntry,
            crate::models::loan::LoanWithHistory,
            crate::models::loan::CreateLoanRequest,
            crate::models::loan::ReturnInfo,
            crate::models::loan::LoanFilters,
            crate::models::enums::LoanStatus,
            crate::models::enums::LoanAction,
            loans::LoanListResponse,
            loans::ReturnData,
            // Health
            health::HealthResponse,
            // Envelopes
            crate::api::MessageResponse,
            crate::api::RouteNotFound,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "users", description = "User management"),
        (name = "loans", description = "Loan lifecycle management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
