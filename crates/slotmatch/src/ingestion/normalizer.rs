use crate::matching::domain::SlotId;
use std::collections::HashSet;

/// Drop unknown and repeated slot references, keeping first-seen order.
///
/// Returns the cleaned list and how many raw entries were dropped.
pub(crate) fn clean_preferences(raw: &[String], known_slots: &HashSet<&str>) -> (Vec<SlotId>, usize) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cleaned = Vec::with_capacity(raw.len());

    for candidate in raw {
        let candidate = candidate.trim();
        if known_slots.contains(candidate) && seen.insert(candidate) {
            cleaned.push(SlotId(candidate.to_string()));
        }
    }

    let dropped = raw.len() - cleaned.len();
    (cleaned, dropped)
}

/// Canonical `<prefix><number>` form, so `P007` and `P7` name the same slot.
pub(crate) fn canonical_id(prefix: char, digits: &str) -> Option<String> {
    digits
        .parse::<u64>()
        .ok()
        .map(|number| format!("{prefix}{number}"))
}
