use crate::auth::AuthContext;
use crate::domains::operator::types::API_KEY_LENGTH;
use crate::domains::operator::OperatorManager;
use crate::errors::{ApiError, ApiResult};
use std::sync::Arc;

/// Implements the Bearer API-key state machine from spec.md §4.10.
pub struct Authenticator {
    operators: Arc<OperatorManager>,
}

impl Authenticator {
    pub fn new(operators: Arc<OperatorManager>) -> Self {
        Self { operators }
    }

    /// `header` is the raw `Authorization` header value, if present.
    pub async fn authenticate(&self, header: Option<&str>) -> ApiResult<AuthContext> {
        let Some(header) = header else {
            return Ok(AuthContext::Anonymous);
        };

        let key = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::invalid_argument("Authorization header must use the Bearer scheme"))?;

        if key.len() != API_KEY_LENGTH {
            return Err(ApiError::invalid_argument(format!(
                "API key must be exactly {API_KEY_LENGTH} characters"
            )));
        }

        let master = self
            .operators
            .get_master_operator()
            .await
            .map_err(ApiError::from)?;
        if key == master.api_key {
            return Ok(AuthContext::Operator(master));
        }

        match self.operators.get_operator_by_api_key(key).await.map_err(ApiError::from)? {
            Some(op) if op.disabled => Err(ApiError::forbidden("operator is disabled")),
            Some(op) => Ok(AuthContext::Operator(op)),
            None => Err(ApiError::unauthorized("no operator matches the supplied API key")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_length_is_checked_before_any_lookup() {
        let too_short = "abc";
        assert_ne!(too_short.len(), API_KEY_LENGTH);
    }
}
