//! In-memory wizard session storage

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::metrics::SessionMetrics;

use super::types::{
    Session, SessionError, SessionResult, SessionStats, SessionUpdate, FIRST_STEP, LAST_STEP,
};

/// Session storage keyed by session id. Contents live for the process lifetime
/// or until evicted.
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a session at the first wizard step
    pub fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4(), Utc::now());
        self.sessions.insert(session.id, session.clone());

        SessionMetrics::record_created();
        tracing::info!(session_id = %session.id, "Session created");

        session
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        let session = self.sessions.get(&id).map(|s| s.clone());
        if session.is_none() {
            tracing::debug!(session_id = %id, "Session not found");
        }
        session
    }

    /// Apply the provided fields and bump `updated_at`
    pub fn update(&self, id: Uuid, update: SessionUpdate) -> SessionResult<Session> {
        if let Some(step) = update.current_step {
            if !(FIRST_STEP..=LAST_STEP).contains(&step) {
                return Err(SessionError::InvalidStep(step));
            }
        }

        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;

        let SessionUpdate {
            current_step,
            idea_description,
            category,
            category_confidence,
            base_answers,
            adaptive_questions,
            adaptive_answers,
            prd,
            prompts,
            project_goal,
        } = update;

        if let Some(step) = current_step {
            session.current_step = step;
        }
        if idea_description.is_some() {
            session.idea_description = idea_description;
        }
        if category.is_some() {
            session.category = category;
        }
        if category_confidence.is_some() {
            session.category_confidence = category_confidence;
        }
        if let Some(answers) = base_answers {
            session.base_answers = answers;
        }
        if let Some(questions) = adaptive_questions {
            session.adaptive_questions = questions;
        }
        if let Some(answers) = adaptive_answers {
            session.adaptive_answers = answers;
        }
        if prd.is_some() {
            session.prd = prd;
        }
        if let Some(prompts) = prompts {
            session.prompts = prompts;
        }
        if project_goal.is_some() {
            session.project_goal = project_goal;
        }
        session.updated_at = Utc::now();

        tracing::info!(session_id = %id, step = session.current_step, "Session updated");
        Ok(session.clone())
    }

    /// Clear all wizard fields, keeping the id and creation time
    pub fn reset(&self, id: Uuid) -> SessionResult<Session> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;

        let mut fresh = Session::new(id, session.created_at);
        fresh.updated_at = Utc::now();
        *session = fresh;

        tracing::info!(session_id = %id, "Session reset");
        Ok(session.clone())
    }

    /// Delete a session. Returns whether it existed.
    pub fn delete(&self, id: Uuid) -> bool {
        let deleted = self.sessions.remove(&id).is_some();
        if deleted {
            SessionMetrics::record_deleted();
            tracing::info!(session_id = %id, "Session deleted");
        }
        deleted
    }

    /// Counts of sessions by step, category and goal
    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats::default();

        for entry in self.sessions.iter() {
            let session = entry.value();
            stats.total += 1;
            *stats.by_step.entry(session.current_step).or_default() += 1;
            if let Some(category) = session.category {
                *stats.by_category.entry(category).or_default() += 1;
            }
            if let Some(goal) = session.project_goal {
                *stats.by_goal.entry(goal).or_default() += 1;
            }
        }

        stats
    }

    /// Remove sessions created before `cutoff` and return how many were removed
    pub fn evict_created_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.created_at >= cutoff);
        let evicted = before.saturating_sub(self.sessions.len());

        if evicted > 0 {
            SessionMetrics::record_evicted(evicted);
            tracing::info!(evicted, remaining = self.sessions.len(), "Old sessions evicted");
        }

        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an Arc-wrapped session store
pub fn create_session_store() -> Arc<SessionStore> {
    Arc::new(SessionStore::new())
}
