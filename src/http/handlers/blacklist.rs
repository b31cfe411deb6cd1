use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::domains::blacklist::BlacklistType;
use crate::errors::{ApiError, ApiResult};
use crate::http::types::{Request, Response};
use crate::types::PaginationParams;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// `entity` accepts a UUID or a SHA-256 hash, resolved by the manager
/// (spec.md §9(c)); `evidence`/`evidence_uuid` are accepted as aliases for
/// the optional linked evidence record.
pub async fn create(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;

    let entity = req.param("entity").or_else(|| req.param("entity_uuid"))
        .ok_or_else(|| ApiError::invalid_argument("entity is required"))?;

    let blacklist_type = req
        .param("type")
        .or_else(|| req.param("blacklist_type"))
        .and_then(|s| BlacklistType::from_str(&s))
        .ok_or_else(|| ApiError::invalid_argument("type must be a recognized blacklist type"))?;

    let evidence_uuid = match req.param("evidence").or_else(|| req.param("evidence_uuid")) {
        Some(s) => Some(
            s.parse::<Uuid>()
                .map_err(|_| ApiError::invalid_argument("evidence must be a valid UUID"))?,
        ),
        None => None,
    };

    let expires = match req.param("expires") {
        Some(s) => Some(parse_expires(&s)?),
        None => None,
    };

    let uuid = ctx
        .blacklist
        .blacklist_entity(&entity, actor.uuid, blacklist_type, expires, evidence_uuid)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::created(serde_json::json!(uuid.to_string())))
}

pub async fn list(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    if !ctx.config.server.public_blacklist && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("blacklist is not publicly visible"));
    }
    let params = pagination_from(req, ctx);
    let include_lifted = matches!(req.param("include_lifted").as_deref(), Some("true") | Some("1"));
    let page = ctx.blacklist.get_entries(params, include_lifted).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(page).unwrap()))
}

pub async fn get(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    if !ctx.config.server.public_blacklist && !auth.is_authenticated() {
        return Err(ApiError::unauthorized("blacklist is not publicly visible"));
    }
    let record = ctx.blacklist.get_blacklist_entry(uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(record).unwrap()))
}

pub async fn delete(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    ctx.blacklist.delete_blacklist_record(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::json!(true)))
}

pub async fn lift(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    let record = ctx.blacklist.lift_blacklist_record(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(record).unwrap()))
}

pub async fn attach_evidence(ctx: &AppContext, req: &Request, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    let evidence_uuid: Uuid = req
        .param("evidence")
        .or_else(|| req.param("evidence_uuid"))
        .ok_or_else(|| ApiError::invalid_argument("evidence is required"))?
        .parse()
        .map_err(|_| ApiError::invalid_argument("evidence must be a valid UUID"))?;
    let record = ctx
        .blacklist
        .attach_evidence(uuid, evidence_uuid, actor.uuid)
        .await
        .map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::to_value(record).unwrap()))
}

fn parse_expires(raw: &str) -> ApiResult<DateTime<Utc>> {
    let ts: i64 = raw.parse().map_err(|_| ApiError::invalid_argument("expires must be a unix timestamp"))?;
    DateTime::from_timestamp(ts, 0).ok_or_else(|| ApiError::invalid_argument("expires is out of range"))
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
    fn parses_valid_unix_timestamp() {
        let ts = Utc::now().timestamp();
        assert!(parse_expires(&ts.to_string()).is_ok());
    }

    #[test]
    fn rejects_non_numeric_expires() {
        assert!(parse_expires("tomorrow").is_err());
    }
}
