//! Result ingestion: turning a results file into a [`RunData`].

use std::path::Path;

use anyhow::Context;

use crate::model::{RunContext, RunData};

/// Format-specific parser for a results file.
pub trait ResultReader: Send + Sync {
    fn read_results(&self, context: &RunContext, path: &Path) -> anyhow::Result<RunData>;
}

/// Reads the native JSON results document (a serialized [`RunData`]).
///
/// Correlation fields the document leaves empty are filled from the context,
/// and a run name stamped on the context overrides the document's name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResultReader;

impl ResultReader for JsonResultReader {
    fn read_results(&self, context: &RunContext, path: &Path) -> anyhow::Result<RunData> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results file: {}", path.display()))?;
        let mut run: RunData = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse results file: {}", path.display()))?;

        if let Some(name) = context.run_name.as_deref().filter(|n| !n.is_empty()) {
            run.name = name.to_string();
        }
        if run.build_id == 0 {
            run.build_id = context.build_id;
        }
        fill(&mut run.owner, &context.owner);
        fill(&mut run.build_flavor, &context.configuration);
        fill(&mut run.build_platform, &context.platform);
        fill(&mut run.release_uri, &context.release_uri);
        fill(&mut run.release_environment_uri, &context.release_environment_uri);

        // Attachment paths are relative to the results file.
        if let Some(base) = path.parent() {
            for attachment in run
                .attachments
                .iter_mut()
                .chain(run.results.iter_mut().flat_map(|r| r.attachments.iter_mut()))
            {
                if attachment.is_relative() {
                    *attachment = base.join(&*attachment);
                }
            }
        }

        Ok(run)
    }
}

fn fill(field: &mut String, fallback: &str) {
    if field.is_empty() {
        *field = fallback.to_string();
    }
}
