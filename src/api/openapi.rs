use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::api::models::{ErrorResponse, GetBalanceRequest, GetBalanceResponse};

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "ApiKey",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(super::handlers::get_balance),
    components(schemas(GetBalanceRequest, GetBalanceResponse, ErrorResponse)),
    modifiers(&SecurityAddon),
    info(
        title = "Walletgate API",
        description = "Batch SOL balance lookups behind a shared cache",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
