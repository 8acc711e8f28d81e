//! Process-wide state, built once in `main` and handed to every handler as
//! `web::Data<AppState>`.

use crate::store::RecordStore;
use crate::uploads::UploadDir;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub uploads: UploadDir,
    /// Where the report renderer looks for its font family.
    pub fonts_dir: PathBuf,
}
