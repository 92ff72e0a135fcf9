//! Phase and time policy.
//!
//! A [`CapSchedule`] maps time to the individual contribution cap: the entry
//! with the latest `starts_at <= t` applies, and a cap of `0` means the sale
//! is closed. A [`PhaseSchedule`] adds the per-grade opening times of a graded
//! sale. A flat sale has no grade times and a single grade, `1`.
//!
//! Boundary timestamps belong to the phase that starts at them.

use carry_types::primitives::{serde_amount, NOT_WHITELISTED};
use carry_types::{Amount, Grade, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::SaleError;

/// One step of the individual-cap schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapEntry {
    pub starts_at: Timestamp,
    #[serde(with = "serde_amount")]
    pub cap: Amount,
}

impl CapEntry {
    pub fn new(starts_at: Timestamp, cap: Amount) -> Self {
        CapEntry { starts_at, cap }
    }
}

/// Individual caps indexed by time, sorted by strictly increasing `starts_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapSchedule {
    entries: Vec<CapEntry>,
}

impl CapSchedule {
    pub fn new(entries: Vec<CapEntry>) -> Result<Self, SaleError> {
        if entries.is_empty() {
            return Err(SaleError::InvalidConfig {
                reason: "individual cap schedule is empty".to_string(),
            });
        }
        if let Some(pair) = entries
            .windows(2)
            .find(|w| w[0].starts_at >= w[1].starts_at)
        {
            return Err(SaleError::InvalidConfig {
                reason: format!(
                    "individual cap schedule is not strictly increasing at {}",
                    pair[1].starts_at
                ),
            });
        }
        Ok(CapSchedule { entries })
    }

    /// A single cap that applies from time 0 onward.
    pub fn constant(cap: Amount) -> Self {
        CapSchedule {
            entries: vec![CapEntry::new(0, cap)],
        }
    }

    pub fn entries(&self) -> &[CapEntry] {
        &self.entries
    }

    /// Index and entry in force at `t`.
    fn entry_at(&self, t: Timestamp) -> Option<(usize, &CapEntry)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| e.starts_at <= t)
    }

    /// The individual cap in force at `t`, or `None` before the first entry.
    pub fn cap_at(&self, t: Timestamp) -> Option<Amount> {
        self.entry_at(t).map(|(_, e)| e.cap)
    }
}

/// Where the sale stands at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the first cap entry.
    NotStarted,
    /// Accepting contributions up to `individual_cap` per address.
    Open {
        index: usize,
        starts_at: Timestamp,
        individual_cap: Amount,
    },
    /// The cap in force is zero.
    Closed,
}

/// Grade opening times combined with the individual-cap schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSchedule {
    grade_times: Vec<Timestamp>,
    caps: CapSchedule,
}

impl PhaseSchedule {
    /// `grade_times[g]` is when grade `g` opens; index 0 must be `0` and the
    /// remaining times must not decrease. An empty list makes a flat sale.
    pub fn new(grade_times: Vec<Timestamp>, caps: CapSchedule) -> Result<Self, SaleError> {
        if let Some(&sentinel) = grade_times.first() {
            if sentinel != 0 {
                return Err(SaleError::InvalidConfig {
                    reason: "whitelist grade 0 is reserved and must be 0".to_string(),
                });
            }
            if grade_times.len() < 2 {
                return Err(SaleError::InvalidConfig {
                    reason: "graded sale needs at least one grade besides 0".to_string(),
                });
            }
            if grade_times.len() > Grade::MAX as usize + 1 {
                return Err(SaleError::InvalidConfig {
                    reason: format!("at most {} whitelist grades", Grade::MAX),
                });
            }
            if let Some(grade) = grade_times[1..]
                .windows(2)
                .position(|w| w[0] > w[1])
                .map(|i| i + 2)
            {
                return Err(SaleError::InvalidConfig {
                    reason: format!("whitelist grade {} opens before grade {}", grade, grade - 1),
                });
            }
        }
        Ok(PhaseSchedule { grade_times, caps })
    }

    pub fn caps(&self) -> &CapSchedule {
        &self.caps
    }

    pub fn is_graded(&self) -> bool {
        !self.grade_times.is_empty()
    }

    /// Number of grades including the reserved grade 0. Valid grades are
    /// `1..grade_count`.
    pub fn grade_count(&self) -> usize {
        if self.is_graded() {
            self.grade_times.len()
        } else {
            2
        }
    }

    pub fn is_valid_grade(&self, grade: Grade) -> bool {
        grade != NOT_WHITELISTED && (grade as usize) < self.grade_count()
    }

    /// When `grade` may start contributing. Flat sales open grade 1 at time 0.
    pub fn grade_opens_at(&self, grade: Grade) -> Option<Timestamp> {
        if !self.is_valid_grade(grade) {
            return None;
        }
        Some(self.grade_times.get(grade as usize).copied().unwrap_or(0))
    }

    /// The individual cap at `t`, `0` when closed or not yet started.
    pub fn individual_cap_at(&self, t: Timestamp) -> Amount {
        self.caps.cap_at(t).unwrap_or(0)
    }

    pub fn current_phase(&self, t: Timestamp) -> Phase {
        match self.caps.entry_at(t) {
            None => Phase::NotStarted,
            Some((_, entry)) if entry.cap == 0 => Phase::Closed,
            Some((index, entry)) => Phase::Open {
                index,
                starts_at: entry.starts_at,
                individual_cap: entry.cap,
            },
        }
    }

    /// Whether an address of `grade` may contribute at `t`.
    pub fn is_open(&self, grade: Grade, t: Timestamp) -> bool {
        match self.grade_opens_at(grade) {
            Some(opens_at) => t >= opens_at && self.individual_cap_at(t) > 0,
            None => false,
        }
    }
}
