//! External-id generation.
//!
//! Application-assigned ids follow the platform convention `PREFIX + YYYYMMDD + random suffix`,
//! e.g. `NTF20250102A7C9X2`. Characters that are easily confused when read aloud or retyped
//! (O/0, I/1) are excluded from the suffix.

use chrono::Utc;
use rand::Rng;

const ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SUFFIX_LEN: usize = 6;

pub const NOTIFICATION_ID_PREFIX: &str = "NTF";
pub const ORDER_ID_PREFIX: &str = "ORD";

pub fn generate_id(prefix: &str) -> String {
    let date = Utc::now().format("%Y%m%d");
    let mut rng = rand::thread_rng();
    let suffix: String =
        (0..SUFFIX_LEN).map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char).collect();
    format!("{prefix}{date}{suffix}")
}

pub fn new_notification_id() -> String {
    generate_id(NOTIFICATION_ID_PREFIX)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn id_shape() {
        let id = new_notification_id();
        assert_eq!(id.len(), 3 + 8 + SUFFIX_LEN);
        assert!(id.starts_with("NTF"));
    }

    #[test]
    fn suffix_avoids_confusable_characters() {
        for _ in 0..50 {
            let id = generate_id("ORD");
            let suffix = &id[id.len() - SUFFIX_LEN..];
            assert!(!suffix.contains(['O', '0', 'I', '1']));
        }
    }
}
