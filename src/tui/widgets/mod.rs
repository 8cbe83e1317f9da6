pub mod dashboard;
pub mod progression_detail;
pub mod progressions;
