use super::{ApplicantRecord, SlotRecord};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct SlotRow {
    #[serde(rename = "Slot")]
    id: String,
    #[serde(rename = "Capacity")]
    capacity: u32,
    #[serde(rename = "Minimum Score")]
    minimum_score: u32,
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    #[serde(rename = "Applicant")]
    id: String,
    #[serde(rename = "Score")]
    score: u32,
    #[serde(rename = "Preferences", default)]
    preferences: String,
}

pub(crate) fn parse_slots<R: Read>(reader: R) -> Result<Vec<SlotRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<SlotRow>() {
        let row = row?;
        records.push(SlotRecord {
            id: row.id,
            capacity: row.capacity,
            minimum_score: row.minimum_score,
        });
    }

    Ok(records)
}

/// Preferences are a single column separated by `;` or whitespace.
pub(crate) fn parse_applicants<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<ApplicantRow>() {
        let row = row?;
        let preferences = row
            .preferences
            .split(|c: char| c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        records.push(ApplicantRecord {
            id: row.id,
            score: row.score,
            preferences,
        });
    }

    Ok(records)
}
