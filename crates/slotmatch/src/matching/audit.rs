use super::domain::{ApplicantId, Population, SlotId};

/// Broken allocation invariant detected on a population.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("slot {slot} holds {occupants} occupants but only has {capacity} seats")]
    OverCapacity {
        slot: SlotId,
        occupants: usize,
        capacity: u32,
    },
    #[error("applicant {applicant} (score {score}) sits in slot {slot} requiring {minimum_score}")]
    BelowThreshold {
        slot: SlotId,
        applicant: ApplicantId,
        score: u32,
        minimum_score: u32,
    },
    #[error("applicant {applicant} claims slot {slot} but is not among its occupants")]
    DanglingAllocation { applicant: ApplicantId, slot: SlotId },
    #[error("slot {slot} lists {applicant} whose allocation points elsewhere")]
    UnclaimedOccupant { slot: SlotId, applicant: ApplicantId },
    #[error("applicant {applicant} and slot {slot} would both prefer each other")]
    BlockingPair { applicant: ApplicantId, slot: SlotId },
}

/// Check capacity, eligibility, consistency, and stability of a population.
pub fn audit(population: &Population) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for slot in population.slots() {
        if slot.occupants.len() > slot.capacity as usize {
            violations.push(InvariantViolation::OverCapacity {
                slot: slot.id.clone(),
                occupants: slot.occupants.len(),
                capacity: slot.capacity,
            });
        }

        for occupant in &slot.occupants {
            match population.applicant(occupant) {
                Some(applicant) if applicant.allocated_slot.as_ref() == Some(&slot.id) => {
                    if !slot.admits(applicant.score) {
                        violations.push(InvariantViolation::BelowThreshold {
                            slot: slot.id.clone(),
                            applicant: applicant.id.clone(),
                            score: applicant.score,
                            minimum_score: slot.minimum_score,
                        });
                    }
                }
                _ => violations.push(InvariantViolation::UnclaimedOccupant {
                    slot: slot.id.clone(),
                    applicant: occupant.clone(),
                }),
            }
        }
    }

    for applicant in population.applicants() {
        if let Some(slot_id) = &applicant.allocated_slot {
            let seated = population
                .slot(slot_id)
                .is_some_and(|slot| slot.occupants.contains(&applicant.id));
            if !seated {
                violations.push(InvariantViolation::DanglingAllocation {
                    applicant: applicant.id.clone(),
                    slot: slot_id.clone(),
                });
            }
        }
    }

    violations.extend(blocking_pairs(population));
    violations
}

/// Applicant/slot pairs where the applicant ranks the slot above its current
/// allocation, qualifies for it, and would win a seat there.
fn blocking_pairs(population: &Population) -> Vec<InvariantViolation> {
    let mut pairs = Vec::new();

    for applicant in population.applicants() {
        let preferred = match applicant.allocated_rank() {
            Some(rank) => &applicant.preferences[..rank - 1],
            None => &applicant.preferences[..],
        };

        for slot_id in preferred {
            let Some(slot) = population.slot(slot_id) else {
                continue;
            };
            if !slot.admits(applicant.score) {
                continue;
            }

            let has_room = !slot.is_full();
            let outscores_weakest = slot
                .occupants
                .iter()
                .filter_map(|occupant| population.applicant(occupant))
                .map(|occupant| occupant.score)
                .min()
                .is_some_and(|weakest| applicant.score > weakest);

            if has_room || outscores_weakest {
                pairs.push(InvariantViolation::BlockingPair {
                    applicant: applicant.id.clone(),
                    slot: slot.id.clone(),
                });
            }
        }
    }

    pairs
}
