//! OpenAPI document for the record schemas.

use crate::model::{Offer, Order, User};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "marketplace-api",
        description = "Users, orders and offers. Create with form or JSON bodies; update with JSON."
    ),
    components(schemas(User, Order, Offer))
)]
pub struct ApiDoc;
