use chrono::{DateTime, Utc};
use log::{debug, warn};

/// Channel carrying master switch notifications; the only channel that
/// drives DNS changes.
pub const SWITCH_MASTER: &str = "+switch-master";

/// The primary role moved to a new network address. Built from one
/// notification message, consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverEvent {
    pub group_name: String,
    pub new_address: String,
    pub raw_payload: String,
    pub received_at: DateTime<Utc>,
}

/// Classify one notification message. Only `+switch-master` with exactly
/// five space-separated tokens (`<master> <oldIP> <oldPort> <newIP>
/// <newPort>`) yields an event; everything else is observed and dropped.
pub fn parse(channel: &str, payload: &str) -> Option<FailoverEvent> {
    if channel != SWITCH_MASTER {
        debug!("Sentinel event on {channel}: {payload}");
        return None;
    }

    let parts: Vec<&str> = payload.split(' ').collect();
    if parts.len() != 5 {
        warn!("Invalid switch-master payload: {payload}");
        return None;
    }

    Some(FailoverEvent {
        group_name: parts[0].to_string(),
        new_address: parts[3].to_string(),
        raw_payload: payload.to_string(),
        received_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch_master() {
        let event = parse(SWITCH_MASTER, "mymaster 10.0.0.1 6379 10.0.0.2 6379").unwrap();
        assert_eq!(event.group_name, "mymaster");
        assert_eq!(event.new_address, "10.0.0.2");
        assert_eq!(event.raw_payload, "mymaster 10.0.0.1 6379 10.0.0.2 6379");
    }

    #[test]
    fn test_four_tokens_rejected() {
        assert!(parse(SWITCH_MASTER, "mymaster 10.0.0.1 6379 10.0.0.2").is_none());
    }

    #[test]
    fn test_six_tokens_rejected() {
        assert!(parse(SWITCH_MASTER, "mymaster 10.0.0.1 6379 10.0.0.2 6379 extra").is_none());
    }

    #[test]
    fn test_double_space_rejected() {
        // Split on single spaces, as the notification format specifies;
        // a doubled separator produces an empty token and the wrong arity.
        assert!(parse(SWITCH_MASTER, "mymaster 10.0.0.1 6379  10.0.0.2 6379").is_none());
    }

    #[test]
    fn test_other_channels_are_informational() {
        assert!(parse("+sentinel", "mymaster 10.0.0.1 6379 10.0.0.2 6379").is_none());
        assert!(parse("+slave", "anything").is_none());
        assert!(parse("__sentinel__:hello", "hello").is_none());
        assert!(parse("foo:convert-to-master", "10.0.0.2").is_none());
    }
}
