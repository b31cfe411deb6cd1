use crate::domains::operator::types::Operator;
use crate::errors::DomainError;
use uuid::Uuid;

/// The authenticated caller for the current request, or the absence of one.
/// Mirrors the teacher's `AuthContext`, but carries an `Operator` directly
/// rather than a role enum: permissions here are independent boolean flags,
/// not a role hierarchy (spec.md §3, §4.10).
#[derive(Debug, Clone)]
pub enum AuthContext {
    Anonymous,
    Operator(Operator),
}

impl AuthContext {
    pub fn operator(&self) -> Option<&Operator> {
        match self {
            AuthContext::Operator(op) => Some(op),
            AuthContext::Anonymous => None,
        }
    }

    pub fn operator_uuid(&self) -> Option<Uuid> {
        self.operator().map(|op| op.uuid)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Operator(_))
    }

    /// Require an authenticated operator, regardless of permissions.
    pub fn require_operator(&self) -> Result<&Operator, DomainError> {
        self.operator()
            .ok_or_else(|| DomainError::Unauthorized("authentication required".into()))
    }

    pub fn require_manage_operators(&self) -> Result<&Operator, DomainError> {
        let op = self.require_operator()?;
        if op.manage_operators {
            Ok(op)
        } else {
            Err(DomainError::PermissionDenied("manage_operators permission required".into()))
        }
    }

    pub fn require_manage_blacklist(&self) -> Result<&Operator, DomainError> {
        let op = self.require_operator()?;
        if op.manage_blacklist {
            Ok(op)
        } else {
            Err(DomainError::PermissionDenied("manage_blacklist permission required".into()))
        }
    }

    pub fn require_is_client(&self) -> Result<&Operator, DomainError> {
        let op = self.require_operator()?;
        if op.is_client {
            Ok(op)
        } else {
            Err(DomainError::PermissionDenied("is_client permission required".into()))
        }
    }

    /// Whether this caller is allowed to see a confidential resource: the
    /// master operator, any operator with `manage_blacklist`, or nobody else.
    pub fn can_view_confidential(&self) -> bool {
        self.operator().map(|op| op.is_master || op.manage_blacklist).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn anonymous_cannot_view_confidential() {
        assert!(!AuthContext::Anonymous.can_view_confidential());
    }

    #[test]
    fn operator_without_manage_blacklist_cannot_view_confidential() {
        let ctx = AuthContext::Operator(operator(false));
        assert!(!ctx.can_view_confidential());
    }

    #[test]
    fn operator_with_manage_blacklist_can_view_confidential() {
        let ctx = AuthContext::Operator(operator(true));
        assert!(ctx.can_view_confidential());
    }
}
