mod focus;
mod tracker;

pub use crate::error::StudyTrackerError;
pub use focus::FocusSession;
pub use tracker::{FinishedSession, STUDY_TOPICS, StudyTrackerService};
