pub mod handlers;
pub mod multipart;
pub mod router;
pub mod types;

use crate::auth::AuthContext;
use crate::context::AppContext;
use crate::errors::ApiError;
use crate::http::types::{Request, Response};
use router::parse_uuid_capture;

/// Entry point for the front server (out of scope here, spec.md §1): decode
/// auth, route, run the handler, and turn any error into an error response
/// so this function itself never fails.
pub async fn dispatch(ctx: &AppContext, mut req: Request) -> Response {
    if req.header("content-type").map(|ct| ct.starts_with("multipart/form-data")).unwrap_or(false) {
        let content_type = req.header("content-type").unwrap().to_string();
        match multipart::decode(&content_type, req.raw_body.clone()).await {
            Ok((fields, files)) => {
                req.form_body.extend(fields);
                req.files = files;
            }
            Err(e) => return Response::error(ApiError::from(crate::errors::DomainError::Upload(e))),
        }
    }

    let auth = match ctx.authenticator.authenticate(req.header("authorization")).await {
        Ok(auth) => auth,
        Err(e) => return Response::error(e),
    };

    match route(ctx, &req, &auth).await {
        Ok(response) => response,
        Err(e) => Response::error(e),
    }
}

async fn route(ctx: &AppContext, req: &Request, auth: &AuthContext) -> Result<Response, ApiError> {
    use handlers::*;

    let method = req.method.to_uppercase();
    let path = req.path.as_str();

    match (method.as_str(), path) {
        ("GET", "/info") => return info::info(ctx).await,
        ("GET", "/favicon.ico") => return Err(ApiError::not_found("no favicon is packaged")),

        ("POST", "/operators") => return operators::create(ctx, req, auth).await,
        ("GET", "/operators") => return operators::list(ctx, req, auth).await,
        ("GET", "/operators/self") => return operators::get_self(ctx, auth).await,
        ("POST", "/operators/refresh") => {
            let caller = auth.require_operator().map_err(ApiError::from)?;
            return operators::refresh(ctx, auth, caller.uuid).await;
        }

        ("POST", "/entities") => return entities::create(ctx, req, auth).await,
        ("GET", "/entities") => return entities::list(ctx, req, auth).await,

        ("POST", "/blacklist") => return blacklist::create(ctx, req, auth).await,
        ("GET", "/blacklist") => return blacklist::list(ctx, req, auth).await,

        ("POST", "/evidence") => return evidence::create(ctx, req, auth).await,
        ("GET", "/evidence") => return evidence::list(ctx, req, auth).await,

        ("POST", "/attachments") => return attachments::upload(ctx, req, auth).await,

        ("GET", "/audit") => return audit::list(ctx, req, auth).await,
        _ => {}
    }

    if router::operator_uuid().is_match(path) {
        let uuid = parse_uuid_capture(router::operator_uuid(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid operator UUID"))?;
        return match method.as_str() {
            "GET" => operators::get_by_uuid(ctx, auth, uuid).await,
            _ => Err(ApiError::method_or_path_not_allowed("unsupported method for /operators/{uuid}")),
        };
    }

    if let Some(caps) = router::operator_action().captures(path) {
        let uuid = parse_uuid_capture(router::operator_action(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid operator UUID"))?;
        let action = caps.get(2).unwrap().as_str();
        if method != "POST" {
            return Err(ApiError::method_or_path_not_allowed("operator actions are POST-only"));
        }
        return match action {
            "delete" => operators::delete(ctx, auth, uuid).await,
            "enable" => operators::enable(ctx, auth, uuid).await,
            "disable" => operators::disable(ctx, auth, uuid).await,
            "manage_operators" => operators::set_manage_operators(ctx, req, auth, uuid).await,
            "manage_blacklist" => operators::set_manage_blacklist(ctx, req, auth, uuid).await,
            "manage_client" => operators::set_client(ctx, req, auth, uuid).await,
            "refresh" => operators::refresh(ctx, auth, uuid).await,
            _ => Err(ApiError::method_or_path_not_allowed("unknown operator action")),
        };
    }

    if let Some(caps) = router::operator_sub_listing().captures(path) {
        let uuid = parse_uuid_capture(router::operator_sub_listing(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid operator UUID"))?;
        let kind = caps.get(2).unwrap().as_str();
        if method != "GET" {
            return Err(ApiError::method_or_path_not_allowed("operator sub-listings are GET-only"));
        }
        return operators::sub_listing(ctx, req, auth, uuid, kind).await;
    }

    if let Some(caps) = router::entity_sub().captures(path) {
        let identifier = caps.get(1).unwrap().as_str().to_string();
        let sub = caps.get(2).unwrap().as_str();
        if method != "GET" {
            return Err(ApiError::method_or_path_not_allowed("entity sub-resources are GET-only"));
        }
        return match sub {
            "query" => entities::query(ctx, req, auth, &identifier).await,
            "audit" | "blacklist" | "evidence" => entities::sub_listing(ctx, req, auth, &identifier, sub).await,
            _ => Err(ApiError::method_or_path_not_allowed("unknown entity sub-resource")),
        };
    }

    if let Some(caps) = router::entity_id().captures(path) {
        let identifier = caps.get(1).unwrap().as_str().to_string();
        return match method.as_str() {
            "GET" => entities::get(ctx, auth, &identifier).await,
            "DELETE" => entities::delete(ctx, auth, &identifier).await,
            _ => Err(ApiError::method_or_path_not_allowed("unsupported method for /entities/{id}")),
        };
    }

    if let Some(caps) = router::blacklist_action().captures(path) {
        let uuid = parse_uuid_capture(router::blacklist_action(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid blacklist UUID"))?;
        let action = caps.get(2).unwrap().as_str();
        if method != "POST" {
            return Err(ApiError::method_or_path_not_allowed("blacklist actions are POST-only"));
        }
        return match action {
            "lift" => blacklist::lift(ctx, auth, uuid).await,
            "attach_evidence" => blacklist::attach_evidence(ctx, req, auth, uuid).await,
            _ => Err(ApiError::method_or_path_not_allowed("unknown blacklist action")),
        };
    }

    if router::blacklist_uuid().is_match(path) {
        let uuid = parse_uuid_capture(router::blacklist_uuid(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid blacklist UUID"))?;
        return match method.as_str() {
            "GET" => blacklist::get(ctx, auth, uuid).await,
            "DELETE" => blacklist::delete(ctx, auth, uuid).await,
            _ => Err(ApiError::method_or_path_not_allowed("unsupported method for /blacklist/{uuid}")),
        };
    }

    if router::evidence_confidentiality().is_match(path) {
        let uuid = parse_uuid_capture(router::evidence_confidentiality(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid evidence UUID"))?;
        if method != "POST" {
            return Err(ApiError::method_or_path_not_allowed("unsupported method for update_confidentiality"));
        }
        return evidence::update_confidentiality(ctx, req, auth, uuid).await;
    }

    if router::evidence_uuid().is_match(path) {
        let uuid = parse_uuid_capture(router::evidence_uuid(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid evidence UUID"))?;
        return match method.as_str() {
            "GET" => evidence::get(ctx, auth, uuid).await,
            "DELETE" => evidence::delete(ctx, auth, uuid).await,
            _ => Err(ApiError::method_or_path_not_allowed("unsupported method for /evidence/{uuid}")),
        };
    }

    if router::attachment_info().is_match(path) {
        let uuid = parse_uuid_capture(router::attachment_info(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid attachment UUID"))?;
        if method != "GET" {
            return Err(ApiError::method_or_path_not_allowed("unsupported method for /attachments/{uuid}/info"));
        }
        return attachments::info(ctx, auth, uuid).await;
    }

    if router::attachment_uuid().is_match(path) {
        let uuid = parse_uuid_capture(router::attachment_uuid(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid attachment UUID"))?;
        return match method.as_str() {
            "GET" => attachments::download(ctx, auth, uuid).await,
            "DELETE" => attachments::delete(ctx, auth, uuid).await,
            _ => Err(ApiError::method_or_path_not_allowed("unsupported method for /attachments/{uuid}")),
        };
    }

    if router::audit_uuid().is_match(path) {
        let uuid = parse_uuid_capture(router::audit_uuid(), path)
            .ok_or_else(|| ApiError::invalid_argument("invalid audit UUID"))?;
        if method != "GET" {
            return Err(ApiError::method_or_path_not_allowed("unsupported method for /audit/{uuid}"));
        }
        return audit::get(ctx, auth, uuid).await;
    }

    Err(ApiError::invalid_argument(format!("no route matches {method} {path}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(method: &str, path: &str) -> Request {
        Request {
            method: method.to_string(),
            path: path.to_string(),
            query: HashMap::new(),
            headers: HashMap::new(),
            json_body: None,
            form_body: HashMap::new(),
            files: HashMap::new(),
            raw_body: Vec::new(),
        }
    }

    #[test]
    fn operator_action_regex_distinguishes_from_plain_uuid_route() {
        let uuid = "550e8400-e29b-41d4-a716-446655440000";
        assert!(router::operator_uuid().is_match(&format!("/operators/{uuid}")));
        assert!(!router::operator_uuid().is_match(&format!("/operators/{uuid}/disable")));
        assert!(router::operator_action().is_match(&format!("/operators/{uuid}/disable")));
    }

    #[test]
    fn builds_a_request_without_touching_the_network() {
        let req = request("GET", "/info");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/info");
    }
}
