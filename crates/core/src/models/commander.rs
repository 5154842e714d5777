use serde::{Deserialize, Serialize};

/// A player account seen in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commander {
    /// In-game commander name.
    pub name: String,
    /// Frontier account id, used to key per-commander preferences.
    pub fid: String,
}

impl Commander {
    /// Commander with the given name and account id.
    pub fn new(name: impl Into<String>, fid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fid: fid.into(),
        }
    }
}
