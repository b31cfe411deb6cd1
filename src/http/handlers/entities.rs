use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::domains::audit::AuditEntryType;
use crate::domains::entity::EntityDossier;
use crate::errors::{ApiError, ApiResult};
use crate::http::types::{Request, Response};
use crate::types::PaginationParams;

/// Registering an entity is a client-only action; anonymous and non-client
/// operators never get to create entities (spec.md §4.4).
pub async fn create(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    let actor = auth.require_is_client().map_err(ApiError::from)?;
    let id = req.param("id").ok_or_else(|| ApiError::invalid_argument("id is required"))?;
    let host = req.param("host").or_else(|| req.param("domain"));

    let (uuid, created) = ctx
        .entities
        .register_entity(&id, host.as_deref())
        .await
        .map_err(ApiError::from)?;

    if created {
        ctx.audit
            .record(AuditEntryType::EntityPushed, "entity pushed", Some(actor.uuid), Some(uuid))
            .await;
    }

    Ok(Response::created(serde_json::json!({ "uuid": uuid.to_string(), "created": created })))
}

pub async fn list(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    if !ctx.config.server.public_entities && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("entity listing is not publicly visible"));
    }
    let params = pagination_from(req, ctx);
    let page = ctx.entities.get_entities(params).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(page).unwrap()))
}

pub async fn get(ctx: &AppContext, auth: &AuthContext, identifier: &str) -> ApiResult<Response> {
    if !ctx.config.server.public_entities && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("entity lookup is not publicly visible"));
    }
    let uuid = ctx.entities.resolve_uuid_or_hash(identifier).await.map_err(ApiError::from)?;
    let entity = ctx.entities.get_entity_by_uuid(uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(entity).unwrap()))
}

pub async fn delete(ctx: &AppContext, auth: &AuthContext, identifier: &str) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    let uuid = ctx.entities.resolve_uuid_or_hash(identifier).await.map_err(ApiError::from)?;
    ctx.entities.delete_entity(uuid).await.map_err(ApiError::from)?;
    ctx.audit
        .record(AuditEntryType::EntityDeleted, "entity deleted", Some(actor.uuid), Some(uuid))
        .await;
    Ok(Response::ok(serde_json::json!(true)))
}

/// `GET /entities/{id}/query` assembles the abuse dossier (spec.md §4.5):
/// the entity row plus its blacklist and evidence history. Confidential
/// evidence and lifted blacklist records are gated separately.
pub async fn query(ctx: &AppContext, req: &Request, auth: &AuthContext, identifier: &str) -> ApiResult<Response> {
    let uuid = ctx.entities.resolve_uuid_or_hash(identifier).await.map_err(ApiError::from)?;
    let entity = ctx.entities.get_entity_by_uuid(uuid).await.map_err(ApiError::from)?;

    let include_lifted = matches!(req.param("include_lifted").as_deref(), Some("true") | Some("1"));
    let include_confidential = auth.can_view_confidential();

    let max = ctx.config.server.max_items_per_kind;
    let full = PaginationParams::clamp(None, Some(max), max);

    let blacklist = ctx
        .blacklist
        .get_entries_by_entity(uuid, full, include_lifted)
        .await
        .map_err(ApiError::from)?
        .items;
    let evidence = ctx
        .evidence
        .get_evidence_by_entity(uuid, full, include_confidential)
        .await
        .map_err(ApiError::from)?
        .items;

    let dossier = EntityDossier { entity, blacklist, evidence };
    Ok(Response::ok(serde_json::to_value(dossier).unwrap()))
}

pub async fn sub_listing(
    ctx: &AppContext,
    req: &Request,
    auth: &AuthContext,
    identifier: &str,
    kind: &str,
) -> ApiResult<Response> {
    let uuid = ctx.entities.resolve_uuid_or_hash(identifier).await.map_err(ApiError::from)?;
    let params = pagination_from(req, ctx);
    let include_lifted = matches!(req.param("include_lifted").as_deref(), Some("true") | Some("1"));

    match kind {
        "audit" => {
            if !ctx.config.server.public_audit_logs && !auth.is_authenticated() {
                return Err(ApiError::unauthorized("audit log is not publicly visible"));
            }
            let page = ctx.audit.get_entries_by_entity(uuid, params).await.map_err(ApiError::from)?;
            Ok(Response::ok(serde_json::to_value(page).unwrap()))
        }
        "blacklist" => {
            if !ctx.config.server.public_blacklist && !auth.is_authenticated() {
                return Err(ApiError::unauthorized("blacklist is not publicly visible"));
            }
            let page = ctx
                .blacklist
                .get_entries_by_entity(uuid, params, include_lifted)
                .await
                .map_err(ApiError::from)?;
            Ok(Response::ok(serde_json::to_value(page).unwrap()))
        }
        "evidence" => {
            if !ctx.config.server.public_evidence && !auth.is_authenticated() {
                return Err(ApiError::unauthorized("evidence is not publicly visible"));
            }
            let page = ctx
                .evidence
                .get_evidence_by_entity(uuid, params, auth.can_view_confidential())
                .await
                .map_err(ApiError::from)?;
            Ok(Response::ok(serde_json::to_value(page).unwrap()))
        }
        _ => Err(ApiError::method_or_path_not_allowed("unknown sub-resource")),
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

    #[test]
    fn pagination_ignores_unparsable_values() {
        let mut req_like_limit: Option<u32> = "not-a-number".parse().ok();
        assert!(req_like_limit.take().is_none());
    }

    #[test]
    fn include_lifted_only_true_for_recognized_truthy_values() {
        assert!(matches!(Some("true"), Some("true") | Some("1")));
        assert!(matches!(Some("1"), Some("true") | Some("1")));
        assert!(!matches!(Some("no"), Some("true") | Some("1")));
    }
}
