//! In-memory project and step storage

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::metrics::ProjectMetrics;

use super::types::{
    IdeaAnalysis, NewStep, Progress, Project, ProjectError, ProjectResult, Step,
    DEFAULT_STEP_MINUTES,
};

/// Projects and their plan steps.
///
/// Steps live in their own map so they can be addressed by id alone. No map
/// guard is held while another map is touched.
pub struct ProjectStore {
    projects: DashMap<Uuid, Project>,
    steps: DashMap<Uuid, Step>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self {
            projects: DashMap::new(),
            steps: DashMap::new(),
        }
    }

    /// Create a project from an idea and its analysis
    pub fn create_project(&self, idea: impl Into<String>, analysis: IdeaAnalysis) -> Project {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            idea: idea.into(),
            problem: analysis.problem,
            product_vision: analysis.product_vision,
            key_features: analysis.key_features,
            steps: Vec::new(),
            created_at: now,
            updated_at: now,
            progress: Progress::default(),
        };

        self.projects.insert(project.id, project.clone());
        ProjectMetrics::record_created();
        tracing::info!(project_id = %project.id, "Project created");

        project
    }

    pub fn get_project(&self, id: Uuid) -> ProjectResult<Project> {
        self.projects
            .get(&id)
            .map(|p| p.clone())
            .ok_or(ProjectError::ProjectNotFound(id))
    }

    /// Replace the product vision, and the key features when given
    pub fn update_product_vision(
        &self,
        id: Uuid,
        product_vision: impl Into<String>,
        key_features: Option<Vec<String>>,
    ) -> ProjectResult<Project> {
        let mut project = self
            .projects
            .get_mut(&id)
            .ok_or(ProjectError::ProjectNotFound(id))?;

        project.product_vision = product_vision.into();
        if let Some(features) = key_features {
            project.key_features = features;
        }
        project.updated_at = Utc::now();

        tracing::info!(project_id = %id, "Product vision updated");
        Ok(project.clone())
    }

    /// Store a generated plan, replacing any previous plan of the project.
    ///
    /// Steps without an explicit order get their 1-based position.
    pub fn add_steps(&self, project_id: Uuid, new_steps: Vec<NewStep>) -> ProjectResult<Vec<Step>> {
        if !self.projects.contains_key(&project_id) {
            return Err(ProjectError::ProjectNotFound(project_id));
        }

        let steps: Vec<Step> = new_steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| Step {
                id: Uuid::new_v4(),
                project_id,
                order: step.order.unwrap_or(index as u32 + 1),
                title: step.title,
                prompt: step.prompt,
                dod: step.dod,
                estimated_minutes: step.estimated_minutes.unwrap_or(DEFAULT_STEP_MINUTES),
                completed: false,
                completed_at: None,
            })
            .collect();

        for step in &steps {
            self.steps.insert(step.id, step.clone());
        }

        let previous = {
            let mut project = self
                .projects
                .get_mut(&project_id)
                .ok_or(ProjectError::ProjectNotFound(project_id))?;

            let previous = std::mem::replace(
                &mut project.steps,
                steps.iter().map(|s| s.id).collect(),
            );
            project.progress = Progress {
                total: steps.len(),
                completed: 0,
            };
            project.updated_at = Utc::now();
            previous
        };

        for id in previous {
            self.steps.remove(&id);
        }

        tracing::info!(project_id = %project_id, steps = steps.len(), "Plan steps added");
        Ok(steps)
    }

    /// Steps of a project ordered by their `order` field
    pub fn get_steps(&self, project_id: Uuid) -> ProjectResult<Vec<Step>> {
        let project = self.get_project(project_id)?;

        let mut steps: Vec<Step> = project
            .steps
            .iter()
            .filter_map(|id| self.steps.get(id).map(|s| s.clone()))
            .collect();
        steps.sort_by_key(|s| s.order);

        Ok(steps)
    }

    pub fn get_step(&self, id: Uuid) -> ProjectResult<Step> {
        self.steps
            .get(&id)
            .map(|s| s.clone())
            .ok_or(ProjectError::StepNotFound(id))
    }

    /// Mark a step completed. Completing a completed step is a no-op.
    pub fn complete_step(&self, id: Uuid) -> ProjectResult<(Step, Progress)> {
        self.set_completed(id, true)
    }

    /// Mark a step not completed. Reverting an open step is a no-op.
    pub fn uncomplete_step(&self, id: Uuid) -> ProjectResult<(Step, Progress)> {
        self.set_completed(id, false)
    }

    fn set_completed(&self, id: Uuid, completed: bool) -> ProjectResult<(Step, Progress)> {
        let (step, changed) = {
            let mut step = self.steps.get_mut(&id).ok_or(ProjectError::StepNotFound(id))?;
            let changed = step.completed != completed;
            if changed {
                step.completed = completed;
                step.completed_at = completed.then(Utc::now);
            }
            (step.clone(), changed)
        };

        if !changed {
            let project = self.get_project(step.project_id)?;
            return Ok((step, project.progress));
        }

        if completed {
            ProjectMetrics::record_step_completed();
        }

        let progress = self.recompute_progress(step.project_id)?;
        tracing::info!(
            step_id = %id,
            project_id = %step.project_id,
            completed,
            done = progress.completed,
            total = progress.total,
            "Step updated"
        );

        Ok((step, progress))
    }

    /// Recount completed steps of a project
    fn recompute_progress(&self, project_id: Uuid) -> ProjectResult<Progress> {
        let step_ids = self.get_project(project_id)?.steps;

        let completed = step_ids
            .iter()
            .filter(|id| self.steps.get(*id).is_some_and(|s| s.completed))
            .count();

        let mut project = self
            .projects
            .get_mut(&project_id)
            .ok_or(ProjectError::ProjectNotFound(project_id))?;
        project.progress.completed = completed;
        project.updated_at = Utc::now();

        Ok(project.progress)
    }

    /// Delete a project and its steps
    pub fn delete_project(&self, id: Uuid) -> ProjectResult<()> {
        let (_, project) = self
            .projects
            .remove(&id)
            .ok_or(ProjectError::ProjectNotFound(id))?;

        for step_id in &project.steps {
            self.steps.remove(step_id);
        }

        ProjectMetrics::record_deleted();
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an Arc-wrapped project store
pub fn create_project_store() -> Arc<ProjectStore> {
    Arc::new(ProjectStore::new())
}
