mod normalizer;
mod tabular;
mod text;

use crate::matching::domain::{Applicant, Population, Slot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Slot record as delivered by an input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub id: String,
    pub capacity: u32,
    pub minimum_score: u32,
}

/// Applicant record as delivered by an input source; preferences are raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub id: String,
    pub score: u32,
    #[serde(default)]
    pub preferences: Vec<String>,
}

#[derive(Debug)]
pub enum IngestionError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidLine { line: usize, reason: String },
    DuplicateSlot(String),
    DuplicateApplicant(String),
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::Io(err) => write!(f, "failed to read matching input: {}", err),
            IngestionError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            IngestionError::InvalidLine { line, reason } => {
                write!(f, "invalid record on line {}: {}", line, reason)
            }
            IngestionError::DuplicateSlot(id) => write!(f, "slot {} is declared twice", id),
            IngestionError::DuplicateApplicant(id) => {
                write!(f, "applicant {} is declared twice", id)
            }
        }
    }
}

impl std::error::Error for IngestionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestionError::Io(err) => Some(err),
            IngestionError::Csv(err) => Some(err),
            IngestionError::InvalidLine { .. }
            | IngestionError::DuplicateSlot(_)
            | IngestionError::DuplicateApplicant(_) => None,
        }
    }
}

impl From<std::io::Error> for IngestionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IngestionError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts gathered while building a population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub slots: usize,
    pub applicants: usize,
    pub dropped_preferences: usize,
}

/// Validated population ready for the matching engine.
#[derive(Debug, Clone)]
pub struct ImportedPopulation {
    pub population: Population,
    pub summary: ImportSummary,
}

/// Builds clean populations out of text, CSV, or structured records.
pub struct PopulationImporter;

impl PopulationImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ImportedPopulation, IngestionError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read the line-oriented text format.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<ImportedPopulation, IngestionError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_text(&content)
    }

    pub fn from_text(content: &str) -> Result<ImportedPopulation, IngestionError> {
        let input = text::parse_text(content)?;
        Self::from_records(input.slots, input.applicants)
    }

    pub fn from_csv_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        slots: P,
        applicants: Q,
    ) -> Result<ImportedPopulation, IngestionError> {
        let slots = std::fs::File::open(slots)?;
        let applicants = std::fs::File::open(applicants)?;
        Self::from_csv_readers(slots, applicants)
    }

    pub fn from_csv_readers<S: Read, A: Read>(
        slots: S,
        applicants: A,
    ) -> Result<ImportedPopulation, IngestionError> {
        let slots = tabular::parse_slots(slots)?;
        let applicants = tabular::parse_applicants(applicants)?;
        Self::from_records(slots, applicants)
    }

    /// Validate ids and clean preference lists against the declared slots.
    pub fn from_records(
        slots: Vec<SlotRecord>,
        applicants: Vec<ApplicantRecord>,
    ) -> Result<ImportedPopulation, IngestionError> {
        let mut known_slots: HashSet<&str> = HashSet::with_capacity(slots.len());
        for slot in &slots {
            if !known_slots.insert(slot.id.as_str()) {
                return Err(IngestionError::DuplicateSlot(slot.id.clone()));
            }
        }

        let mut seen_applicants: HashSet<&str> = HashSet::with_capacity(applicants.len());
        let mut dropped_preferences = 0;
        let mut cleaned = Vec::with_capacity(applicants.len());

        for record in &applicants {
            if !seen_applicants.insert(record.id.as_str()) {
                return Err(IngestionError::DuplicateApplicant(record.id.clone()));
            }

            let (preferences, dropped) =
                normalizer::clean_preferences(&record.preferences, &known_slots);
            if dropped > 0 {
                debug!(applicant = %record.id, dropped, "dropped invalid or repeated preferences");
            }
            dropped_preferences += dropped;
            cleaned.push(Applicant::new(record.id.clone(), record.score, preferences));
        }

        let slots: Vec<Slot> = slots
            .into_iter()
            .map(|record| Slot::new(record.id, record.capacity, record.minimum_score))
            .collect();

        let summary = ImportSummary {
            slots: slots.len(),
            applicants: cleaned.len(),
            dropped_preferences,
        };
        info!(
            slots = summary.slots,
            applicants = summary.applicants,
            dropped_preferences,
            "matching input loaded"
        );

        Ok(ImportedPopulation {
            population: Population::new(cleaned, slots),
            summary,
        })
    }
}
