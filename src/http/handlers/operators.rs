use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::errors::{ApiError, ApiResult};
use crate::http::types::{Request, Response};
use crate::types::PaginationParams;
use uuid::Uuid;

/// Handler contract per spec.md §4.10: resolve operator, check permission,
/// validate input, call the manager, emit audit on success, serialize.

pub async fn create(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    let name = req.param("name").ok_or_else(|| ApiError::invalid_argument("name is required"))?;

    let uuid = ctx.operators.create_operator(&name, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::created(serde_json::json!(uuid.to_string())))
}

pub async fn list(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    auth.require_manage_operators().map_err(ApiError::from)?;
    let params = pagination_from(req, ctx);
    let page = ctx.operators.get_operators(params).await.map_err(ApiError::from)?;
    let reveal = true;
    let results: Vec<_> = page.items.iter().map(|op| op.to_view(reveal)).collect();
    Ok(Response::ok(serde_json::json!({
        "items": results,
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "total_pages": page.total_pages,
    })))
}

pub async fn get_self(_ctx: &AppContext, auth: &AuthContext) -> ApiResult<Response> {
    let operator = auth.require_operator().map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(operator.to_view(true)).unwrap()))
}

pub async fn get_by_uuid(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let operator = ctx.operators.get_operator(uuid).await.map_err(ApiError::from)?;
    let reveal = auth
        .operator()
        .map(|caller| caller.manage_operators || caller.uuid == uuid)
        .unwrap_or(false);
    Ok(Response::ok(serde_json::to_value(operator.to_view(reveal)).unwrap()))
}

pub async fn delete(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    ctx.operators.delete_operator(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::json!(true)))
}

pub async fn enable(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    let op = ctx.operators.enable_operator(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(op.to_view(false)).unwrap()))
}

pub async fn disable(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    let op = ctx.operators.disable_operator(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(op.to_view(false)).unwrap()))
}

pub async fn set_manage_operators(ctx: &AppContext, req: &Request, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    let value = bool_param(req, "value")?;
    let op = ctx.operators.set_manage_operators(uuid, value, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(op.to_view(false)).unwrap()))
}

pub async fn set_manage_blacklist(ctx: &AppContext, req: &Request, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    let value = bool_param(req, "value")?;
    let op = ctx.operators.set_manage_blacklist(uuid, value, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(op.to_view(false)).unwrap()))
}

pub async fn set_client(ctx: &AppContext, req: &Request, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_operators().map_err(ApiError::from)?;
    let value = bool_param(req, "value")?;
    let op = ctx.operators.set_client(uuid, value, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(op.to_view(false)).unwrap()))
}

/// `self OR manage_operators` for the target; master-operator refresh is
/// always forbidden regardless of caller (spec.md §4.11, scenario 5).
pub async fn refresh(ctx: &AppContext, auth: &AuthContext, target: Uuid) -> ApiResult<Response> {
    let caller = auth.require_operator().map_err(ApiError::from)?;
    if caller.uuid != target && !caller.manage_operators {
        return Err(ApiError::forbidden("refreshing another operator's key requires manage_operators"));
    }
    let master = ctx.operators.get_master_operator().await.map_err(ApiError::from)?;
    if target == master.uuid {
        return Err(ApiError::forbidden("Cannot refresh API key for master operator"));
    }
    let op = ctx.operators.refresh_api_key(target, caller.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(op.to_view(true)).unwrap()))
}

pub async fn sub_listing(
    ctx: &AppContext,
    req: &Request,
    auth: &AuthContext,
    operator_uuid: Uuid,
    kind: &str,
) -> ApiResult<Response> {
    let params = pagination_from(req, ctx);
    match kind {
        "audit" => {
            if !ctx.config.server.public_audit_logs && !auth.is_authenticated() {
                return Err(ApiError::unauthorized("audit log is not publicly visible"));
            }
            let page = ctx.audit.get_entries_by_operator(operator_uuid, params).await.map_err(ApiError::from)?;
            Ok(Response::ok(serde_json::to_value(page).unwrap()))
        }
        "evidence" => {
            if !ctx.config.server.public_evidence && !auth.is_authenticated() {
                return Err(ApiError::unauthorized("evidence is not publicly visible"));
            }
            let page = ctx
                .evidence
                .get_evidence_by_operator(operator_uuid, params, auth.can_view_confidential())
                .await
                .map_err(ApiError::from)?;
            Ok(Response::ok(serde_json::to_value(page).unwrap()))
        }
        "blacklist" => {
            if !ctx.config.server.public_blacklist && !auth.is_authenticated() {
                return Err(ApiError::unauthorized("blacklist is not publicly visible"));
            }
            let page = ctx
                .blacklist
                .get_entries_by_operator(operator_uuid, params)
                .await
                .map_err(ApiError::from)?;
            Ok(Response::ok(serde_json::to_value(page).unwrap()))
        }
        _ => Err(ApiError::method_or_path_not_allowed("unknown sub-resource")),
    }
}

fn bool_param(req: &Request, name: &str) -> ApiResult<bool> {
    match req.param(name).as_deref() {
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        _ => Err(ApiError::invalid_argument(format!("{name} must be a boolean"))),
    }
}

fn pagination_from(req: &Request, ctx: &AppContext) -> PaginationParams {
    let page = req.param("page").and_then(|p| p.parse().ok());
    let limit = req.param("limit").and_then(|l| l.parse().ok());
    PaginationParams::clamp(page, limit, ctx.config.server.max_items_per_kind)
}

