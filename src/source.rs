use std::fs;
use std::path::Path;

use anyhow::Context;
use knowledge_graph_view::{GraphData, LayoutConfig};

pub fn load_graph(path: &Path) -> anyhow::Result<GraphData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let data = GraphData::from_json(&text)
        .with_context(|| format!("failed to parse graph file {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        nodes = data.nodes.len(),
        edges = data.edges.len(),
        "graph file loaded"
    );
    Ok(data)
}

/// Reads the layout config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout config {}", path.display()))?;
    LayoutConfig::from_json(&text)
        .with_context(|| format!("invalid layout config {}", path.display()))
}
