//! Session export as a ZIP bundle for the coding assistant.
//!
//! Archive layout:
//! - `PRD.md`
//! - `setup-prompt.txt`, `planning-prompt.txt`, `implementation-prompt.txt`, `debug-prompt.txt`
//! - `deploy-instructions.txt` with one section per deploy variant
//! - `metadata.json`
//!
//! Entries other than `metadata.json` are written only when the session has them.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::metrics::ExportMetrics;
use crate::questions::{category_emoji, Category, ProjectGoal};
use crate::session::{PromptSet, Session};

const DEPLOY_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// A finished archive
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportMetadata<'a> {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    category: Option<Category>,
    category_name: Option<&'static str>,
    category_emoji: &'static str,
    goal: Option<ProjectGoal>,
    idea_description: Option<&'a str>,
    exported_at: DateTime<Utc>,
}

pub fn archive_filename(session_id: Uuid) -> String {
    format!("cursor-guide-{}.zip", session_id)
}

/// Deploy prompts as one document, `None` when the session has none
pub fn deploy_instructions(prompts: &PromptSet) -> Option<String> {
    let sections: Vec<String> = [
        ("Vercel", &prompts.deploy_vercel),
        ("Docker", &prompts.deploy_docker),
        ("Local", &prompts.deploy_local),
    ]
    .into_iter()
    .filter_map(|(title, text)| {
        text.as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("# {}\n\n{}", title, t))
    })
    .collect();

    (!sections.is_empty()).then(|| sections.join(DEPLOY_SEPARATOR))
}

/// Build the archive bytes for a session
pub fn build_archive(session: &Session, exported_at: DateTime<Utc>) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let prompts = &session.prompts;
    let entries = [
        ("PRD.md", session.prd.as_deref()),
        ("setup-prompt.txt", prompts.setup.as_deref()),
        ("planning-prompt.txt", prompts.planning.as_deref()),
        ("implementation-prompt.txt", prompts.implementation.as_deref()),
        ("debug-prompt.txt", prompts.debug_prompt.as_deref()),
    ];

    for (name, content) in entries {
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }
    }

    if let Some(deploy) = deploy_instructions(prompts) {
        zip.start_file("deploy-instructions.txt", options)?;
        zip.write_all(deploy.as_bytes())?;
    }

    let metadata = ExportMetadata {
        session_id: session.id,
        created_at: session.created_at,
        category: session.category,
        category_name: session.category.map(|c| c.display_name()),
        category_emoji: category_emoji(session.category),
        goal: session.project_goal,
        idea_description: session.idea_description.as_deref(),
        exported_at,
    };
    zip.start_file("metadata.json", options)?;
    zip.write_all(serde_json::to_string_pretty(&metadata)?.as_bytes())?;

    Ok(zip.finish()?.into_inner())
}

/// Build the archive of `session` on the blocking pool
pub async fn export_session(session: Session) -> Result<ExportArchive, ExportError> {
    let session_id = session.id;

    let result = tokio::task::spawn_blocking(move || build_archive(&session, Utc::now()))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))
        .and_then(|built| built);

    match result {
        Ok(bytes) => {
            ExportMetrics::record_success(bytes.len());
            tracing::info!(session_id = %session_id, size = bytes.len(), "Session exported");
            Ok(ExportArchive {
                filename: archive_filename(session_id),
                bytes,
            })
        }
        Err(e) => {
            ExportMetrics::record_failure();
            tracing::error!(session_id = %session_id, error = %e, "Session export failed");
            Err(e)
        }
    }
}
