//! Request context extraction for the audit trail.

use axum::http::HeaderMap;
use wagerdesk_core::audit::ActorContext;
use wagerdesk_core::transfer::Actor;

/// Builds the audit actor context from request headers. Fields missing
/// from the request fall back to the system defaults.
#[must_use]
pub fn actor_context(headers: &HeaderMap) -> ActorContext {
    let defaults = ActorContext::default();
    ActorContext {
        admin_id: header_string(headers, "x-admin-id").unwrap_or(defaults.admin_id),
        admin_name: header_string(headers, "x-admin-name").unwrap_or(defaults.admin_name),
        ip_address: header_string(headers, "x-forwarded-for")
            .map_or(defaults.ip_address, |raw| {
                raw.split(',').next().unwrap_or_default().trim().to_string()
            }),
        user_agent: header_string(headers, "user-agent").unwrap_or(defaults.user_agent),
    }
}

/// The ledger actor corresponding to an audit context.
#[must_use]
pub fn ledger_actor(context: &ActorContext) -> Actor {
    Actor::new(context.admin_id.clone(), context.admin_name.clone())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_defaults_when_headers_missing() {
        let context = actor_context(&HeaderMap::new());
        assert_eq!(context.admin_id, "ADM-001");
        assert_eq!(context.admin_name, "Super Admin");
        assert_eq!(context.ip_address, "127.0.0.1");
        assert_eq!(context.user_agent, "System-Trigger");
    }

    #[test]
    fn test_first_forwarded_ip_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));
        let context = actor_context(&headers);
        assert_eq!(context.ip_address, "203.0.113.7");
        assert_eq!(context.user_agent, "curl/8.0");
    }
}
