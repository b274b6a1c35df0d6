//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, transactions, users};

/// Registers the JWT bearer scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/v1/auth/login"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookshare API",
        version = "1.0.0",
        description = "Neighborhood book sharing REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        // Users
        users::me,
        // Books
        books::list_books,
        books::lookup_book,
        books::create_book,
        books::my_books,
        // Transactions
        transactions::request_book,
        transactions::my_requests,
        transactions::update_transaction,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            auth::LoginResponse,
            auth::MessageResponse,
            // Users
            crate::models::User,
            // Books
            crate::models::Book,
            crate::models::BookStatus,
            crate::models::BookQuery,
            crate::models::CreateBook,
            crate::models::BookMetadata,
            // Transactions
            crate::models::Transaction,
            crate::models::TransactionStatus,
            crate::models::TransactionAction,
            crate::models::TransactionDetails,
            crate::models::transaction::CreateTransactionRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Signup and login"),
        (name = "users", description = "Current user"),
        (name = "books", description = "Book catalog and ISBN lookup"),
        (name = "transactions", description = "Borrow requests and lending lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
