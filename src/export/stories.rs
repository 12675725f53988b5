//! Stories document exporter.

use serde::Serialize;

use super::steps::{export_story_steps, StepExport};
use crate::types::VersionGraph;

/// The stories document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoriesDocument {
    /// Document schema version.
    pub version: String,
    /// Story blocks, sorted by name.
    pub stories: Vec<StoryExport>,
}

/// One story block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryExport {
    /// Story name.
    pub story: String,
    /// Ordered steps, alternation groups folded.
    pub steps: Vec<StepExport>,
}

/// Build the stories document for one graph.
///
/// Stories with no emittable steps are dropped; the runtime rejects empty
/// blocks.
pub fn build_stories(graph: &VersionGraph) -> StoriesDocument {
    let mut stories: Vec<_> = graph.stories.iter().collect();
    stories.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = Vec::new();
    for story in stories {
        let mut steps: Vec<_> = graph
            .story_steps
            .iter()
            .filter(|s| s.story_id == story.id)
            .collect();
        steps.sort_by_key(|s| (s.timeline_index, s.step_order, s.id));

        let exported = export_story_steps(graph, &steps);
        if !exported.is_empty() {
            out.push(StoryExport {
                story: story.name.clone(),
                steps: exported,
            });
        }
    }

    StoriesDocument {
        version: crate::DOCUMENT_SCHEMA_VERSION.to_string(),
        stories: out,
    }
}
