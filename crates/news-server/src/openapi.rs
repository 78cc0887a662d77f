use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "News Today API",
        version = "0.1.0",
        description = "CRUD API for news categories."
    ),
    paths(
        crate::routes::create_category,
        crate::routes::list_categories,
        crate::routes::get_category,
        crate::routes::update_category,
        crate::routes::delete_category,
        crate::routes::status,
    ),
    components(schemas(
        crate::dto::CategoryRequest,
        crate::dto::CreateCategoryResponse,
        crate::dto::CategoryResponse,
        crate::dto::CategoryListResponse,
        crate::dto::StatusResponse,
        crate::dto::ErrorResponse,
        crate::dto::ErrorBody,
    )),
    tags(
        (name = "categories", description = "Category management"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
