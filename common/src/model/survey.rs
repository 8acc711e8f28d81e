//! Survey submission model shared between the backend and any client.
//!
//! A `SurveyRecord` is what a surveyor submits for one visit to a school. The
//! backend persists it and hands it back as a `StoredRecord`, which adds the
//! identifier assigned by the record store.
//!
//! Field names on the wire are camelCase (`schoolName`, `imagePath`, ...) so the
//! JSON shape matches the form fields the submission endpoint accepts.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Number of entries in the fault table.
pub const FAULT_COUNT: usize = 5;

/// Fixed fault table. Position `i` of a record's `FaultFlags` refers to entry `i`.
pub const FAULT_DESCRIPTIONS: [&str; FAULT_COUNT] = [
    "Ease and adjust all windows and doors",
    "Replace damaged seals/gaskets",
    "Replace broken window handles, hinges, and other ironmongery",
    "Replace damaged/broken down double glazed units",
    "Overhaul window operating/locking mechanisms",
];

/// Identifier assigned by the record store when a record is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

/// One survey submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub school_name: String,
    pub location: String,
    pub faults: FaultFlags,
    #[serde(default)]
    pub comments: String,
    /// Public paths (`/uploads/...`) of the images attached to the submission.
    #[serde(default)]
    pub image_path: Vec<String>,
}

impl SurveyRecord {
    /// Comments with surrounding whitespace removed, or `None` when nothing is left.
    pub fn comments_text(&self) -> Option<&str> {
        let trimmed = self.comments.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(&self.comments)
        }
    }
}

/// A record as returned by the store, together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub record: SurveyRecord,
}

/// Fault checklist decoded into one boolean per fault table entry.
///
/// On the wire the flags travel as a sequence of strings where only the literal
/// `"true"` marks a fault as selected. Deserialisation also accepts JSON booleans
/// and sequences shorter than the table (missing positions are unselected), but
/// rejects anything longer than `FAULT_COUNT`. Serialisation always produces
/// exactly `FAULT_COUNT` strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaultFlags([bool; FAULT_COUNT]);

impl FaultFlags {
    pub fn new(flags: [bool; FAULT_COUNT]) -> Self {
        Self(flags)
    }

    pub fn as_array(&self) -> [bool; FAULT_COUNT] {
        self.0
    }

    /// Descriptions of the selected faults, in fault table order.
    pub fn selected(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0
            .iter()
            .zip(FAULT_DESCRIPTIONS)
            .filter_map(|(set, description)| set.then_some(description))
    }
}

impl Serialize for FaultFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(FAULT_COUNT))?;
        for flag in self.0 {
            seq.serialize_element(if flag { "true" } else { "false" })?;
        }
        seq.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Text(String),
    Bool(bool),
    Null(()),
}

impl RawFlag {
    fn is_set(&self) -> bool {
        match self {
            RawFlag::Text(text) => text == "true",
            RawFlag::Bool(flag) => *flag,
            RawFlag::Null(()) => false,
        }
    }
}

impl<'de> Deserialize<'de> for FaultFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<RawFlag>::deserialize(deserializer)?;
        if raw.len() > FAULT_COUNT {
            return Err(de::Error::invalid_length(
                raw.len(),
                &"at most 5 fault flags",
            ));
        }
        let mut flags = [false; FAULT_COUNT];
        for (slot, flag) in flags.iter_mut().zip(&raw) {
            *slot = flag.is_set();
        }
        Ok(Self(flags))
    }
}
