use serde::Deserialize;

/// Query string of the lookup endpoints (`?schoolName=...`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolNameQuery {
    pub school_name: String,
}
