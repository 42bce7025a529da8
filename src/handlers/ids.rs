//! Type-tagged external IDs.
//!
//! Ledger UUIDs never appear bare on the wire; each resource type carries
//! its own prefix (`auth_`, `cap_`, `void_`, `ref_`) so an authorization id
//! cannot be fed to the captures endpoint by accident.

use uuid::Uuid;

pub const PREFIX_AUTHORIZATION: &str = "auth_";
pub const PREFIX_CAPTURE: &str = "cap_";
pub const PREFIX_VOID: &str = "void_";
pub const PREFIX_REFUND: &str = "ref_";

pub fn format_authorization_id(id: Uuid) -> String {
    format!("{PREFIX_AUTHORIZATION}{id}")
}

pub fn format_capture_id(id: Uuid) -> String {
    format!("{PREFIX_CAPTURE}{id}")
}

pub fn format_void_id(id: Uuid) -> String {
    format!("{PREFIX_VOID}{id}")
}

pub fn format_refund_id(id: Uuid) -> String {
    format!("{PREFIX_REFUND}{id}")
}

pub fn parse_authorization_id(id: &str) -> Option<Uuid> {
    parse_prefixed(id, PREFIX_AUTHORIZATION)
}

pub fn parse_capture_id(id: &str) -> Option<Uuid> {
    parse_prefixed(id, PREFIX_CAPTURE)
}

pub fn parse_refund_id(id: &str) -> Option<Uuid> {
    parse_prefixed(id, PREFIX_REFUND)
}

fn parse_prefixed(id: &str, prefix: &str) -> Option<Uuid> {
    let raw = id.strip_prefix(prefix)?;
    Uuid::parse_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parse_round_trip() {
        let id = Uuid::new_v4();

        assert_eq!(parse_authorization_id(&format_authorization_id(id)), Some(id));
        assert_eq!(parse_capture_id(&format_capture_id(id)), Some(id));
        assert_eq!(parse_refund_id(&format_refund_id(id)), Some(id));
    }

    #[test]
    fn formatted_ids_are_canonical_lowercase() {
        let id = Uuid::new_v4();
        let formatted = format_authorization_id(id);

        assert!(formatted.starts_with("auth_"));
        // 36-char canonical UUID after the prefix.
        assert_eq!(formatted.len(), "auth_".len() + 36);
        assert_eq!(formatted, formatted.to_lowercase());
    }

    #[test]
    fn mismatched_prefix_is_rejected() {
        let id = Uuid::new_v4();
        assert_eq!(parse_authorization_id(&format_capture_id(id)), None);
        assert_eq!(parse_capture_id(&format_authorization_id(id)), None);
        assert_eq!(parse_refund_id(&format_void_id(id)), None);
    }

    #[test]
    fn malformed_uuid_is_rejected() {
        assert_eq!(parse_authorization_id("auth_not-a-uuid"), None);
        assert_eq!(parse_authorization_id("auth_"), None);
        assert_eq!(parse_capture_id(""), None);
    }
}
