use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A federation operator: either the implicit master operator (materialized
/// from config, never stored) or a row in the `operators` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub uuid: Uuid,
    pub name: String,
    pub api_key: String,
    pub manage_operators: bool,
    pub manage_blacklist: bool,
    pub is_client: bool,
    pub disabled: bool,
    pub is_master: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OperatorRow {
    pub uuid: String,
    pub name: String,
    pub api_key: String,
    pub manage_operators: bool,
    pub manage_blacklist: bool,
    pub is_client: bool,
    pub disabled: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl OperatorRow {
    pub fn into_entity(self) -> Result<Operator, uuid::Error> {
        Ok(Operator {
            uuid: Uuid::parse_str(&self.uuid)?,
            name: self.name,
            api_key: self.api_key,
            manage_operators: self.manage_operators,
            manage_blacklist: self.manage_blacklist,
            is_client: self.is_client,
            disabled: self.disabled,
            is_master: false,
            created: self.created,
            updated: self.updated,
        })
    }
}

/// Public view of an operator, omitting the API key unless the caller is the
/// operator themselves or a master operator (spec.md §4.3).
#[derive(Debug, Clone, Serialize)]
pub struct OperatorView {
    pub uuid: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub manage_operators: bool,
    pub manage_blacklist: bool,
    pub is_client: bool,
    pub disabled: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Operator {
    pub fn to_view(&self, reveal_api_key: bool) -> OperatorView {
        OperatorView {
            uuid: self.uuid,
            name: self.name.clone(),
            api_key: if reveal_api_key { Some(self.api_key.clone()) } else { None },
            manage_operators: self.manage_operators,
            manage_blacklist: self.manage_blacklist,
            is_client: self.is_client,
            disabled: self.disabled,
            created: self.created,
            updated: self.updated,
        }
    }
}

impl Operator {
    /// Flattens an operator into the field map the cache trades in
    /// (`master` is never serialized; the master row is never cached,
    /// see [`crate::domains::operator::service::OperatorManager`]).
    pub fn to_cache_fields(&self) -> std::collections::HashMap<String, String> {
        let mut fields = std::collections::HashMap::new();
        fields.insert("uuid".to_string(), self.uuid.to_string());
        fields.insert("name".to_string(), self.name.clone());
        fields.insert("api_key".to_string(), self.api_key.clone());
        fields.insert("manage_operators".to_string(), self.manage_operators.to_string());
        fields.insert("manage_blacklist".to_string(), self.manage_blacklist.to_string());
        fields.insert("is_client".to_string(), self.is_client.to_string());
        fields.insert("disabled".to_string(), self.disabled.to_string());
        fields.insert("created".to_string(), self.created.to_rfc3339());
        fields.insert("updated".to_string(), self.updated.to_rfc3339());
        fields
    }

    pub fn from_cache_fields(fields: &std::collections::HashMap<String, String>) -> Option<Self> {
        let get_bool = |k: &str| fields.get(k).map(|v| v == "true").unwrap_or(false);
        Some(Self {
            uuid: Uuid::parse_str(fields.get("uuid")?).ok()?,
            name: fields.get("name")?.clone(),
            api_key: fields.get("api_key")?.clone(),
            manage_operators: get_bool("manage_operators"),
            manage_blacklist: get_bool("manage_blacklist"),
            is_client: get_bool("is_client"),
            disabled: get_bool("disabled"),
            is_master: false,
            created: DateTime::parse_from_rfc3339(fields.get("created")?).ok()?.with_timezone(&Utc),
            updated: DateTime::parse_from_rfc3339(fields.get("updated")?).ok()?.with_timezone(&Utc),
        })
    }
}

const API_KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const API_KEY_LENGTH: usize = 32;

/// Mint a random 32-character alphanumeric API key, the same shape the
/// master key and every operator key share (spec.md §4.10).
pub fn generate_api_key() -> String {
    let mut rng = rand::rng();
    (0..API_KEY_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..API_KEY_ALPHABET.len());
            API_KEY_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_api_key_has_expected_length_and_alphabet() {
        let key = generate_api_key();
        assert_eq!(key.len(), API_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn view_hides_api_key_unless_revealed() {
        let operator = Operator {
            uuid: Uuid::new_v4(),
            name: "acme".into(),
            api_key: "secret".into(),
            manage_operators: false,
            manage_blacklist: false,
            is_client: true,
            disabled: false,
            is_master: false,
            created: Utc::now(),
            updated: Utc::now(),
        };
        assert!(operator.to_view(false).api_key.is_none());
        assert_eq!(operator.to_view(true).api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn cache_fields_round_trip_except_is_master() {
        let operator = Operator {
            uuid: Uuid::new_v4(),
            name: "acme".into(),
            api_key: "x".repeat(32),
            manage_operators: true,
            manage_blacklist: false,
            is_client: true,
            disabled: false,
            is_master: true,
            created: Utc::now(),
            updated: Utc::now(),
        };
        let fields = operator.to_cache_fields();
        let restored = Operator::from_cache_fields(&fields).expect("round trip");
        assert_eq!(restored.uuid, operator.uuid);
        assert_eq!(restored.name, operator.name);
        assert_eq!(restored.manage_operators, operator.manage_operators);
        assert!(!restored.is_master);
    }
}
