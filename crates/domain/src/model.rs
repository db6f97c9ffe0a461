//! Domain models and value objects

use serde::{Deserialize, Serialize};

/// One job posting in the careers listing
///
/// Two entries are the same posting iff `name` and `link` are byte-identical,
/// query string included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Display label of the posting
    pub name: String,
    /// Absolute URL of the posting, exactly as scraped
    pub link: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
        }
    }

    /// The link without its query string, for reports only
    pub fn display_link(&self) -> &str {
        match self.link.split_once('?') {
            Some((base, _)) => base,
            None => &self.link,
        }
    }
}

/// All entries observed in one fetch, in fetch order
pub type Snapshot = Vec<Entry>;

/// Whether an entry appeared or disappeared between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Added,
    Removed,
}

/// A single change between two snapshots
///
/// Serialized as `{"link": {"name": .., "link": ..}, "action": "added"}` to stay
/// readable by state directories written by earlier versions of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    #[serde(rename = "link")]
    pub entry: Entry,
    pub action: ChangeAction,
}

impl DiffRecord {
    pub fn added(entry: Entry) -> Self {
        Self {
            entry,
            action: ChangeAction::Added,
        }
    }

    pub fn removed(entry: Entry) -> Self {
        Self {
            entry,
            action: ChangeAction::Removed,
        }
    }
}

/// Result of one completed watch cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// The listing matched the stored snapshot
    Unchanged { entries: usize },
    /// Postings were added or removed
    Changed {
        changes: Vec<DiffRecord>,
        report: String,
        notified: bool,
    },
}

impl CycleOutcome {
    pub fn changes(&self) -> &[DiffRecord] {
        match self {
            CycleOutcome::Unchanged { .. } => &[],
            CycleOutcome::Changed { changes, .. } => changes,
        }
    }
}
