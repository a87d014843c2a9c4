use serde::{Deserialize, Deserializer, Serialize};

/// One pet as served by `GET /pets`. Fields other than `name` and `breed` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub breed: String,
}

impl PetRecord {
    pub fn new(name: impl Into<String>, breed: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            breed: breed.into(),
        }
    }
}

// 缺少或為 null 的欄位一律視為空字串
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Records in server response order.
pub type PetCollection = Vec<PetRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedList {
    pub markup: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The target now holds `records` blocks from this invocation.
    Rendered { records: usize, generation: u64 },
    /// A newer invocation started before this one could write.
    Superseded { generation: u64 },
}
