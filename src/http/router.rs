use regex::Regex;
use std::sync::OnceLock;

const UUID_PATTERN: &str = r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";
const HASH_OR_UUID_PATTERN: &str = r"(?:[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}|[0-9a-fA-F]{64})";

macro_rules! route_regex {
    ($name:ident, $pattern:expr) => {
        pub fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

route_regex!(operator_uuid, &format!("^/operators/({UUID_PATTERN})$"));
route_regex!(operator_action, &format!("^/operators/({UUID_PATTERN})/(delete|enable|disable|manage_operators|manage_blacklist|manage_client|refresh)$"));
route_regex!(operator_sub_listing, &format!("^/operators/({UUID_PATTERN})/(audit|evidence|blacklist)$"));
route_regex!(entity_id, &format!("^/entities/({HASH_OR_UUID_PATTERN})$"));
route_regex!(entity_sub, &format!("^/entities/({HASH_OR_UUID_PATTERN})/(query|audit|blacklist|evidence)$"));
route_regex!(blacklist_uuid, &format!("^/blacklist/({UUID_PATTERN})$"));
route_regex!(blacklist_action, &format!("^/blacklist/({UUID_PATTERN})/(lift|attach_evidence)$"));
route_regex!(evidence_uuid, &format!("^/evidence/({UUID_PATTERN})$"));
route_regex!(evidence_confidentiality, &format!("^/evidence/({UUID_PATTERN})/update_confidentiality$"));
route_regex!(attachment_uuid, &format!("^/attachments/({UUID_PATTERN})$"));
route_regex!(attachment_info, &format!("^/attachments/({UUID_PATTERN})/info$"));
route_regex!(audit_uuid, &format!("^/audit/({UUID_PATTERN})$"));

pub fn parse_uuid_capture(re: &Regex, path: &str) -> Option<uuid::Uuid> {
    re.captures(path)
        .and_then(|c| c.get(1))
        .and_then(|m| uuid::Uuid::parse_str(m.as_str()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_uuid_pattern_matches_canonical_uuid() {
        let path = "/operators/550e8400-e29b-41d4-a716-446655440000";
        assert!(operator_uuid().is_match(path));
        assert!(parse_uuid_capture(operator_uuid(), path).is_some());
    }

    #[test]
    fn entity_id_pattern_accepts_hash_or_uuid() {
        assert!(entity_id().is_match(&format!("/entities/{}", "a".repeat(64))));
        assert!(entity_id().is_match("/entities/550e8400-e29b-41d4-a716-446655440000"));
        assert!(!entity_id().is_match("/entities/not-a-valid-identifier"));
    }

    #[test]
    fn operator_action_pattern_captures_action_name() {
        let path = "/operators/550e8400-e29b-41d4-a716-446655440000/disable";
        let caps = operator_action().captures(path).unwrap();
        assert_eq!(&caps[2], "disable");
    }
}
