// ABOUTME: Mention - one unit of work received from the Coral bus.
// ABOUTME: Parses the wait-tool payload tolerantly; unparseable means no mention.

use serde::Deserialize;
use tracing::debug;

/// An inbound addressed message from another agent.
///
/// Consumed exactly once per loop iteration and never persisted; if the
/// process dies mid-handling, retry semantics live in the bus, not here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mention {
    #[serde(rename = "threadId", alias = "thread_id")]
    pub thread_id: String,
    #[serde(rename = "senderId", alias = "sender_id")]
    pub sender_id: String,
    #[serde(alias = "message")]
    pub content: String,
}

/// Parse whatever the wait tool returned into mentions.
///
/// Accepts a single mention object, a bare array, or a
/// `{"mentions": [...]}` envelope. Anything else - including the plain
/// "no new messages" text the bus emits on timeout - yields no mentions.
pub fn parse_mentions(payload: &str) -> Vec<Mention> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) else {
        debug!("wait payload is not JSON; treating as no mention");
        return Vec::new();
    };

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(ref map) if map.contains_key("mentions") => {
            match map.get("mentions") {
                Some(serde_json::Value::Array(items)) => items.clone(),
                _ => return Vec::new(),
            }
        }
        object @ serde_json::Value::Object(_) => vec![object],
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Mention>(item) {
            Ok(mention) => Some(mention),
            Err(e) => {
                debug!(error = %e, "skipping malformed mention");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object() {
        let mentions = parse_mentions(
            r#"{"threadId": "t-1", "senderId": "interface_agent", "content": "build /tmp/demo"}"#,
        );

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].thread_id, "t-1");
        assert_eq!(mentions[0].sender_id, "interface_agent");
        assert_eq!(mentions[0].content, "build /tmp/demo");
    }

    #[test]
    fn test_bare_array() {
        let mentions = parse_mentions(
            r#"[{"threadId": "t-1", "senderId": "a", "content": "x"},
                {"threadId": "t-2", "senderId": "b", "content": "y"}]"#,
        );

        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[1].thread_id, "t-2");
    }

    #[test]
    fn test_mentions_envelope() {
        let mentions = parse_mentions(
            r#"{"mentions": [{"threadId": "t-9", "senderId": "a", "content": "scan it"}]}"#,
        );

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].content, "scan it");
    }

    #[test]
    fn test_snake_case_aliases() {
        let mentions = parse_mentions(
            r#"{"thread_id": "t-1", "sender_id": "a", "message": "upload please"}"#,
        );

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].content, "upload please");
    }

    #[test]
    fn test_timeout_text_yields_nothing() {
        let mentions = parse_mentions("No new messages received within the timeout period");
        assert!(mentions.is_empty());
    }

    #[test]
    fn test_object_missing_fields_skipped() {
        let mentions = parse_mentions(r#"{"threadId": "t-1"}"#);
        assert!(mentions.is_empty());
    }

    #[test]
    fn test_malformed_entry_does_not_poison_rest() {
        let mentions = parse_mentions(
            r#"[{"threadId": "t-1"}, {"threadId": "t-2", "senderId": "b", "content": "y"}]"#,
        );

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].thread_id, "t-2");
    }
}
