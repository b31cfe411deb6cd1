use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::errors::{ApiError, ApiResult};
use crate::http::types::{Request, Response};
use crate::types::PaginationParams;
use uuid::Uuid;

pub async fn create(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    let entity = req.param("entity").or_else(|| req.param("entity_uuid"))
        .ok_or_else(|| ApiError::invalid_argument("entity is required"))?;
    let entity_uuid = ctx.entities.resolve_uuid_or_hash(&entity).await.map_err(ApiError::from)?;

    let text_content = req.param("text_content");
    let note = req.param("note");
    let tag = req.param("tag");
    let confidential = matches!(req.param("confidential").as_deref(), Some("true") | Some("1"));

    let uuid = ctx
        .evidence
        .add_evidence(entity_uuid, actor.uuid, text_content.as_deref(), note.as_deref(), tag.as_deref(), confidential)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::created(serde_json::json!(uuid.to_string())))
}

pub async fn list(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    if !ctx.config.server.public_evidence && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("evidence is not publicly visible"));
    }
    let params = pagination_from(req, ctx);
    let page = ctx
        .evidence
        .get_evidence_records(params, auth.can_view_confidential())
        .await
        .map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(page).unwrap()))
}

/// Confidential evidence is hidden from callers without `manage_blacklist`:
/// anonymous callers get 401, authenticated-but-unprivileged callers get 403
/// (spec.md §4.6, scenario 4).
pub async fn get(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let evidence = ctx.evidence.get_evidence(uuid).await.map_err(ApiError::from)?;
    if evidence.confidential && !auth.can_view_confidential() {
        return Err(confidentiality_error(auth));
    }
    Ok(Response::ok(serde_json::to_value(evidence).unwrap()))
}

pub async fn delete(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    ctx.evidence.delete_evidence(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::json!(true)))
}

pub async fn update_confidentiality(ctx: &AppContext, req: &Request, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    let confidential = match req.param("confidential").as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => return Err(ApiError::invalid_argument("confidential must be a boolean")),
    };
    let updated = ctx
        .evidence
        .update_confidentiality(uuid, confidential, actor.uuid)
        .await
        .map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(updated).unwrap()))
}

fn confidentiality_error(auth: &AuthContext) -> ApiError {
    if auth.is_authenticated() {
        ApiError::forbidden("this evidence is confidential")
    } else {
        ApiError::unauthorized("this evidence is confidential")
    }
}

fn pagination_from(req: &Request, ctx: &AppContext) -> PaginationParams {
    let page = req.param("page").and_then(|p| p.parse().ok());
    let limit = req.param("limit").and_then(|l| l.parse().ok());
    PaginationParams::clamp(page, limit, ctx.config.server.max_items_per_kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::operator::types::Operator;
    use chrono::Utc;

    fn operator(manage_blacklist: bool) -> Operator {
        Operator {
            uuid: Uuid::new_v4(),
            name: "op".into(),
            api_key: "x".repeat(32),
            manage_operators: false,
            manage_blacklist,
            is_client: false,
            disabled: false,
            is_master: false,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn anonymous_caller_gets_unauthorized_on_confidential_evidence() {
        let err = confidentiality_error(&AuthContext::Anonymous);
        assert_eq!(err.status, 401);
    }

    #[test]
    fn authenticated_unprivileged_caller_gets_forbidden() {
        let err = confidentiality_error(&AuthContext::Operator(operator(false)));
        assert_eq!(err.status, 403);
    }
}
