//! Audit trail construction.
//!
//! Every admin-facing operation records who did what, from where, with a
//! structured trace of the operation and its parameters. Entries are
//! built here and persisted by the database layer; recording is
//! best-effort and must never fail the operation being audited.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids;

/// Audit log categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditCategory {
    /// Logins, permission changes, blocked access.
    Security,
    /// Fund movements and balance changes.
    Finance,
    /// Vendor lifecycle operations.
    Vendor,
    /// Everything else (health checks, configuration).
    System,
}

impl AuditCategory {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Security => "Security",
            Self::Finance => "Finance",
            Self::Vendor => "Vendor",
            Self::System => "System",
        }
    }
}

/// Outcome of the audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    /// The operation completed.
    Success,
    /// The operation was rejected or errored.
    Failed,
}

impl AuditStatus {
    /// Stable string form used in persisted rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Request-scoped identity of whoever triggered the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Admin ID from the session, or the system default.
    pub admin_id: String,
    /// Admin display name.
    pub admin_name: String,
    /// Client IP address.
    pub ip_address: String,
    /// Client user agent.
    pub user_agent: String,
}

impl Default for ActorContext {
    fn default() -> Self {
        Self {
            admin_id: "ADM-001".to_string(),
            admin_name: "Super Admin".to_string(),
            ip_address: "127.0.0.1".to_string(),
            user_agent: "System-Trigger".to_string(),
        }
    }
}

/// Structured record of what an operation did, stored instead of raw SQL
/// text so the trail can be queried and never leaks statement internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTrace {
    /// Machine-readable operation name, e.g. `vendor.create`.
    pub operation: String,
    /// Operation parameters as JSON. Secrets must be redacted by the caller.
    pub params: Value,
}

impl OperationTrace {
    /// Creates a trace from an operation name and JSON parameters.
    #[must_use]
    pub fn new(operation: impl Into<String>, params: Value) -> Self {
        Self {
            operation: operation.into(),
            params,
        }
    }
}

/// A complete audit entry ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Externally visible token (`TRC-…`), distinct from the row id.
    pub security_token: String,
    /// Short action name, e.g. `CREATE_VENDOR`.
    pub action: String,
    /// Log category.
    pub category: AuditCategory,
    /// Human-readable summary.
    pub details: String,
    /// Structured trace of the operation.
    pub trace: OperationTrace,
    /// Outcome.
    pub status: AuditStatus,
    /// Who triggered the operation.
    pub actor: ActorContext,
    /// Snapshot of the affected row before the operation, if any.
    pub prev_state: Option<Value>,
    /// Snapshot of the affected row after the operation, if any.
    pub new_state: Option<Value>,
}

impl AuditEntry {
    /// Builds an audit entry with a freshly minted security token.
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        category: AuditCategory,
        details: impl Into<String>,
        trace: OperationTrace,
        status: AuditStatus,
        actor: ActorContext,
    ) -> Self {
        Self {
            security_token: ids::security_token(),
            action: action.into(),
            category,
            details: details.into(),
            trace,
            status,
            actor,
            prev_state: None,
            new_state: None,
        }
    }

    /// Attaches before/after snapshots of the affected row.
    #[must_use]
    pub fn with_states(mut self, prev_state: Option<Value>, new_state: Option<Value>) -> Self {
        self.prev_state = prev_state;
        self.new_state = new_state;
        self
    }

    /// Shorthand for a successful operation.
    #[must_use]
    pub fn success(
        action: impl Into<String>,
        category: AuditCategory,
        details: impl Into<String>,
        trace: OperationTrace,
        actor: ActorContext,
    ) -> Self {
        Self::new(action, category, details, trace, AuditStatus::Success, actor)
    }

    /// Shorthand for a failed operation.
    #[must_use]
    pub fn failure(
        action: impl Into<String>,
        category: AuditCategory,
        details: impl Into<String>,
        trace: OperationTrace,
        actor: ActorContext,
    ) -> Self {
        Self::new(action, category, details, trace, AuditStatus::Failed, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_actor_is_system_trigger() {
        let actor = ActorContext::default();
        assert_eq!(actor.admin_id, "ADM-001");
        assert_eq!(actor.admin_name, "Super Admin");
        assert_eq!(actor.ip_address, "127.0.0.1");
        assert_eq!(actor.user_agent, "System-Trigger");
    }

    #[test]
    fn test_entry_mints_token() {
        let entry = AuditEntry::success(
            "CREATE_VENDOR",
            AuditCategory::Vendor,
            "Created vendor Acme Book",
            OperationTrace::new("vendor.create", json!({"vendor_id": "VND-100"})),
            ActorContext::default(),
        );
        assert!(entry.security_token.starts_with("TRC-"));
        assert_eq!(entry.status, AuditStatus::Success);
        assert_eq!(entry.category.as_str(), "Vendor");
    }

    #[test]
    fn test_with_states_attaches_snapshots() {
        let entry = AuditEntry::success(
            "ADJUST_CREDIT",
            AuditCategory::Finance,
            "Raised credit limit",
            OperationTrace::new("vendor.adjust_credit", json!({"vendor_id": "VND-100"})),
            ActorContext::default(),
        )
        .with_states(
            Some(json!({"credit_limit": "1000"})),
            Some(json!({"credit_limit": "1500"})),
        );
        assert_eq!(entry.prev_state.unwrap()["credit_limit"], "1000");
        assert_eq!(entry.new_state.unwrap()["credit_limit"], "1500");
    }

    #[test]
    fn test_trace_serializes_as_structured_json() {
        let trace = OperationTrace::new(
            "funds.allocate",
            json!({"vendor_id": "VND-100", "amount": "1000"}),
        );
        let value = serde_json::to_value(&trace).expect("serialize");
        assert_eq!(value["operation"], "funds.allocate");
        assert_eq!(value["params"]["amount"], "1000");
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(AuditStatus::Success.as_str(), "success");
        assert_eq!(AuditStatus::Failed.as_str(), "failed");
    }
}
