//! Property inspection reports ("expertises").

pub mod domain;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Assessments, Building, BuildingType, Condition, Evaluations, Expertise, ExpertiseDraft,
    GlobalEvaluation, RoomRatings, SystemAssessment,
};
pub use router::expertise_router;
pub use scoring::GlobalCondition;
pub use service::ExpertiseService;
