//! Correlation id generation.

use uuid::Uuid;

/// Length of generated correlation ids.
pub const SHORT_ID_LEN: usize = 12;

/// Generates a short random correlation id.
pub fn next_short() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// Returns the supplied id, or a fresh one when it is missing or empty.
pub fn or_generate(correlation_id: Option<&str>) -> String {
    match correlation_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => next_short(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_short_and_distinct() {
        let a = next_short();
        let b = next_short();
        assert_eq!(a.len(), SHORT_ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn supplied_ids_are_kept() {
        assert_eq!(or_generate(Some("123")), "123");
        assert_eq!(or_generate(Some("")).len(), SHORT_ID_LEN);
        assert_eq!(or_generate(None).len(), SHORT_ID_LEN);
    }
}
