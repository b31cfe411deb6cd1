use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::domains::attachment::PendingUpload;
use crate::errors::{ApiError, ApiResult};
use crate::http::types::{Request, Response, ResponseBody};
use uuid::Uuid;

/// Attachments upload to a specific evidence record; the multipart file
/// field must be named `file` (spec.md §4.7).
pub async fn upload(ctx: &AppContext, req: &Request, auth: &AuthContext) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    let evidence_str = req.param("evidence").or_else(|| req.param("evidence_uuid"))
        .ok_or_else(|| ApiError::invalid_argument("evidence is required"))?;
    let evidence_uuid: Uuid = evidence_str
        .parse()
        .map_err(|_| ApiError::invalid_argument("evidence must be a valid UUID"))?;

    let pending = req.files.get("file").ok_or_else(|| ApiError::invalid_argument("a file field named 'file' is required"))?;
    let upload = PendingUpload {
        original_filename: pending.original_filename.clone(),
        data: pending.data.clone(),
    };

    let uuid = ctx.attachments.upload(evidence_uuid, upload, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::created(serde_json::json!(uuid.to_string())))
}

pub async fn info(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let attachment = ctx.attachments.get_record(uuid).await.map_err(ApiError::from)?;
    guard_confidential(ctx, auth, attachment.evidence).await?;
    Ok(Response::ok(serde_json::to_value(attachment).unwrap()))
}

pub async fn download(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let attachment = ctx.attachments.get_record(uuid).await.map_err(ApiError::from)?;
    guard_confidential(ctx, auth, attachment.evidence).await?;

    let file = ctx.attachments.open_for_streaming(uuid).await.map_err(ApiError::from)?;
    let mut headers = std::collections::HashMap::new();
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    Ok(Response {
        status: 200,
        headers,
        body: ResponseBody::Stream {
            file,
            content_type: attachment.file_mime,
            content_length: attachment.file_size,
            content_disposition: Some(format!("attachment; filename=\"{}\"", attachment.file_name)),
        },
    })
}

pub async fn delete(ctx: &AppContext, auth: &AuthContext, uuid: Uuid) -> ApiResult<Response> {
    let actor = auth.require_manage_blacklist().map_err(ApiError::from)?;
    ctx.attachments.delete(uuid, actor.uuid).await.map_err(ApiError::from)?;
    Ok(Response::ok(serde_json::json!(true)))
}

/// An attachment inherits its visibility from the evidence record it
/// belongs to: confidential evidence hides its attachments the same way.
async fn guard_confidential(ctx: &AppContext, auth: &AuthContext, evidence_uuid: Uuid) -> ApiResult<()> {
    let evidence = ctx.evidence.get_evidence(evidence_uuid).await.map_err(ApiError::from)?;
    if evidence.confidential && !auth.can_view_confidential() {
        return Err(if auth.is_authenticated() {
            ApiError::forbidden("this attachment is confidential")
        } else {
            ApiError::unauthorized("this attachment is confidential")
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_upload_is_cloned_field_by_field_not_derived() {
        let original = PendingUpload { original_filename: "a.txt".into(), data: vec![1, 2, 3] };
        let copy = PendingUpload { original_filename: original.original_filename.clone(), data: original.data.clone() };
        assert_eq!(copy.original_filename, original.original_filename);
        assert_eq!(copy.data, original.data);
    }
}
