//! Global score derivation for expertise evaluations.
//!
//! Every consumer (service, PDF report, CLI) goes through these functions so the averaging
//! and banding rules exist exactly once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Evaluations, RoomRatings};

pub const FAVORABLE_THRESHOLD: f64 = 4.0;
pub const CORRECT_THRESHOLD: f64 = 2.5;

/// Band derived from the global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalCondition {
    Favorable,
    Correct,
    Critique,
}

impl GlobalCondition {
    pub fn from_score(score: f64) -> Self {
        if score >= FAVORABLE_THRESHOLD {
            GlobalCondition::Favorable
        } else if score >= CORRECT_THRESHOLD {
            GlobalCondition::Correct
        } else {
            GlobalCondition::Critique
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GlobalCondition::Favorable => "Favorable",
            GlobalCondition::Correct => "Correct",
            GlobalCondition::Critique => "Critique",
        }
    }
}

fn mean<I: IntoIterator<Item = u8>>(ratings: I) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating), count + 1)
        });
    (count > 0).then(|| f64::from(sum) / f64::from(count))
}

/// Mean of every present rating across every room; 0.0 when nothing was rated.
pub fn global_score(rooms: &BTreeMap<String, RoomRatings>) -> f64 {
    mean(rooms.values().flat_map(RoomRatings::present)).unwrap_or(0.0)
}

/// Mean of one room's present ratings.
pub fn room_score(ratings: &RoomRatings) -> Option<f64> {
    mean(ratings.present())
}

/// Stored score when present, otherwise recomputed from the room ratings.
pub fn resolved_score(evaluations: &Evaluations) -> f64 {
    evaluations
        .global
        .score
        .unwrap_or_else(|| global_score(&evaluations.rooms))
}

/// Explicit condition when present, otherwise the band of [`resolved_score`].
pub fn resolved_condition(evaluations: &Evaluations) -> GlobalCondition {
    evaluations
        .global
        .condition
        .unwrap_or_else(|| GlobalCondition::from_score(resolved_score(evaluations)))
}

/// Fills the derived global fields left empty by the client. Explicit values are kept.
pub fn fill_derived(evaluations: &mut Evaluations) {
    if evaluations.global.score.is_none() {
        let has_ratings = evaluations
            .rooms
            .values()
            .any(|ratings| ratings.present().next().is_some());
        if has_ratings {
            evaluations.global.score = Some(global_score(&evaluations.rooms));
        }
    }
    if evaluations.global.condition.is_none() && evaluations.global.score.is_some() {
        evaluations.global.condition = Some(resolved_condition(evaluations));
    }
}
