//! Correlation Identifier Generation
//!
//! Produces journal numbers and message ids for correlating operations
//! across a distributed deployment. Both formats combine a second-resolution
//! timestamp, a wrapping sequence counter, and the statically configured
//! instance/node tags.

use crate::config::InstanceConfig;
use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence counters are process-wide: every generator instance draws from
/// the same pair, one for journal numbers and one for message ids.
static JOURNAL_SEQ: AtomicU64 = AtomicU64::new(0);
static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generator for correlation identifiers.
///
/// The sequence component wraps modulo 10000; identifiers generated within
/// one second tick stay distinct through the counter alone, so more than
/// 10000 allocations inside a single tick can collide. That rate is far
/// beyond the request volume this format is sized for and is accepted.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    instance_id: String,
    node_id: String,
}

impl IdGenerator {
    /// Build a generator carrying the configured instance/node tags,
    /// trimmed of surrounding whitespace.
    pub fn new(config: &InstanceConfig) -> Self {
        IdGenerator {
            instance_id: config.instance_id.trim().to_string(),
            node_id: config.node_id.trim().to_string(),
        }
    }

    /// Next journal number: `<timestamp><seq><node-id>`.
    pub fn next_journal_number(&self) -> String {
        let seq = JOURNAL_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}{}", timestamp(), sequence_field(seq), self.node_id)
    }

    /// Next message id: `<instance-id><node-id><timestamp><seq>`.
    pub fn next_message_id(&self) -> String {
        let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "{}{}{}{}",
            self.instance_id,
            self.node_id,
            timestamp(),
            sequence_field(seq)
        )
    }
}

/// 14-digit local timestamp, second resolution.
fn timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// 4-digit zero-padded sequence field, wrapping modulo 10000.
fn sequence_field(seq: u64) -> String {
    format!("{:04}", seq % 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn generator() -> IdGenerator {
        IdGenerator::new(&InstanceConfig {
            instance_id: " svc-orders ".to_string(),
            node_id: " 07 ".to_string(),
        })
    }

    #[test]
    fn test_message_id_shape() {
        let id = generator().next_message_id();
        // tags are trimmed: instance + node + 14-digit timestamp + 4-digit seq
        assert!(id.starts_with("svc-orders07"));
        let tail = &id["svc-orders07".len()..];
        assert_eq!(tail.len(), 18);
        assert!(tail.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_journal_number_shape() {
        let jrn = generator().next_journal_number();
        assert!(jrn.ends_with("07"));
        let head = &jrn[..jrn.len() - 2];
        assert_eq!(head.len(), 18);
        assert!(head.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_sequence_field_wraps_at_ten_thousand() {
        assert_eq!(sequence_field(1), "0001");
        assert_eq!(sequence_field(9_999), "9999");
        assert_eq!(sequence_field(10_000), "0000");
        assert_eq!(sequence_field(10_001), "0001");
    }

    #[test]
    fn test_empty_tags_yield_digit_only_ids() {
        let gen = IdGenerator::new(&InstanceConfig {
            instance_id: "  ".to_string(),
            node_id: String::new(),
        });
        let id = gen.next_message_id();
        assert_eq!(id.len(), 18);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_consecutive_ids_are_distinct() {
        let gen = generator();
        let ids: HashSet<String> = (0..100).map(|_| gen.next_message_id()).collect();
        assert_eq!(ids.len(), 100);
    }
}
