//! Legacy project model: a product analysis plus an ordered plan of steps
//! with completion tracking.

mod store;
mod types;

pub use store::{create_project_store, ProjectStore};
pub use types::{
    IdeaAnalysis, NewStep, Progress, Project, ProjectError, ProjectResult, Step,
    DEFAULT_STEP_MINUTES,
};
