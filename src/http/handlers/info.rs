use crate::context::AppContext;
use crate::errors::ApiResult;
use crate::http::types::Response;

pub async fn info(ctx: &AppContext) -> ApiResult<Response> {
    Ok(Response::ok(serde_json::json!({
        "name": ctx.config.server.name,
        "base_url": ctx.config.server.base_url,
        "max_upload_size": ctx.config.server.max_upload_size,
    })))
}
