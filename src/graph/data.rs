use serde::{Deserialize, Deserializer, Serialize};

/// Graph snapshot as supplied by the data-fetch layer.
///
/// Ids may arrive as JSON strings or integers; both are normalized to strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default, alias = "links")]
    pub edges: Vec<EdgeData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(deserialize_with = "node_id")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(deserialize_with = "node_id")]
    pub source: String,
    #[serde(deserialize_with = "node_id")]
    pub target: String,
    #[serde(default)]
    pub weight: Option<f32>,
}

impl GraphData {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl NodeData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind: None,
            size: None,
            x: None,
            y: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

impl EdgeData {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }
}

fn node_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Signed(id) => id.to_string(),
        RawId::Unsigned(id) => id.to_string(),
    })
}
