use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::domains::audit::AuditEntryType;
use crate::errors::{ApiError, ApiResult};
use crate::http::types::{Request, Response};
use crate::types::PaginationParams;
use uuid::Uuid;

/// Anonymous callers only ever see entry types named in
/// `public_audit_entries`, and only when `public_audit_logs` is set
/// (spec.md §4.9, §6).
pub async fn list(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    if !ctx.config.server.public_audit_logs && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("audit log is not publicly visible"));
    }
    let params = pagination_from(req, ctx);
    let type_filter = visible_type_filter(ctx, auth);
    let page = ctx
        .audit
        .get_entries(params, type_filter.as_deref())
        .await
        .map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(page).unwrap()))
}

pub async fn get(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    if !ctx.config.server.public_audit_logs && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("audit log is not publicly visible"));
    }
    let entry = ctx.audit.get_entry(uuid).await.map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("audit entry not found"))?;

    if !auth.is_authenticated() && !ctx.config.server.public_audit_entries.contains(&entry.entry_type) {
        return Err(ApiError::not_found("audit entry not found"));
    }

    Ok(Response::ok(serde_json::to_value(entry).unwrap()))
}

fn visible_type_filter(ctx: &AppContext, auth: &AuthContext) -> Option<Vec<AuditEntryType>> {
    if auth.is_authenticated() {
        None
    } else {
        Some(ctx.config.server.public_audit_entries.clone())
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
    fn anonymous_caller_is_restricted_to_public_entry_types() {
        let allowed = vec![AuditEntryType::EntityBlacklisted];
        assert!(allowed.contains(&AuditEntryType::EntityBlacklisted));
        assert!(!allowed.contains(&AuditEntryType::OperatorCreated));
    }
}
