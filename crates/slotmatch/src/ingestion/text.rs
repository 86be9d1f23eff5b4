use super::normalizer::canonical_id;
use super::{ApplicantRecord, IngestionError, SlotRecord};
use regex::Regex;
use std::sync::OnceLock;

fn slot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\(P(\d+),\s*(\d+),\s*(\d+)\)").expect("slot pattern compiles")
    })
}

fn applicant_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\(A(\d+)\):\(([^)]*)\)\s*\((\d+)\)").expect("applicant pattern compiles")
    })
}

fn preference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^P(\d+)$").expect("preference pattern compiles"))
}

/// Raw records found in a text input, before preference cleaning.
#[derive(Debug, Default)]
pub(crate) struct TextInput {
    pub(crate) slots: Vec<SlotRecord>,
    pub(crate) applicants: Vec<ApplicantRecord>,
}

/// Scan every line for slot `(P<n>, <capacity>, <minimum>)` and applicant
/// `(A<n>):(P<x>, P<y>, ...) (<score>)` records. Other lines are ignored.
pub(crate) fn parse_text(content: &str) -> Result<TextInput, IngestionError> {
    let mut input = TextInput::default();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;

        if let Some(captures) = slot_pattern().captures(line) {
            input.slots.push(SlotRecord {
                id: id_field('P', &captures[1], line_number)?,
                capacity: number_field(&captures[2], line_number)?,
                minimum_score: number_field(&captures[3], line_number)?,
            });
            continue;
        }

        if let Some(captures) = applicant_pattern().captures(line) {
            let preferences = captures[2]
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(preference_token)
                .collect();

            input.applicants.push(ApplicantRecord {
                id: id_field('A', &captures[1], line_number)?,
                score: number_field(&captures[3], line_number)?,
                preferences,
            });
        }
    }

    Ok(input)
}

/// Canonicalize `P<n>` tokens; anything else is kept verbatim and later
/// dropped as an unknown slot.
fn preference_token(token: &str) -> String {
    preference_pattern()
        .captures(token)
        .and_then(|captures| canonical_id('P', &captures[1]))
        .unwrap_or_else(|| token.to_string())
}

fn id_field(prefix: char, digits: &str, line: usize) -> Result<String, IngestionError> {
    canonical_id(prefix, digits).ok_or_else(|| IngestionError::InvalidLine {
        line,
        reason: format!("identifier {prefix}{digits} is out of range"),
    })
}

fn number_field(digits: &str, line: usize) -> Result<u32, IngestionError> {
    digits.parse().map_err(|_| IngestionError::InvalidLine {
        line,
        reason: format!("value {digits} does not fit in 32 bits"),
    })
}
