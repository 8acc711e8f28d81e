//! # Survey Report Layout
//!
//! Turns the records of one school into a flat list of `Block`s describing the
//! report: title, one numbered section per record, decoded faults and an image
//! grid. The layout step does no PDF work at all; `render` consumes the blocks
//! and produces the document with genpdf.
//!
//! Image paths are resolved here. A path that no longer points at a file becomes
//! an `ImageCell::Unavailable` in its original slot, so one missing photo never
//! costs the rest of the report.

mod render;

pub use render::render_report;

use crate::uploads::UploadDir;
use actix_web::error::BlockingError;
use std::path::PathBuf;
use common::model::survey::StoredRecord;
use thiserror::Error;

pub const IMAGES_PER_ROW: usize = 4;
/// Edge of the square cell each image is fitted into, in millimetres.
pub const CELL_MM: f64 = 35.0;
/// Gap between neighbouring cells, in millimetres.
pub const SPACING_MM: f64 = 3.5;
/// Blank lines after every record section.
const SECTION_SPACING_LINES: f64 = 2.0;

pub const NO_COMMENTS: &str = "No comments";
pub const NO_FAULTS: &str = "No faults selected.";
pub const NO_IMAGES: &str = "No image paths provided.";
pub const IMAGE_UNAVAILABLE: &str = "Image not available.";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not load a font family from {dir}: {source}")]
    Font {
        dir: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },
    #[error("pdf rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),
    #[error("blocking pool unavailable")]
    Blocking(#[from] BlockingError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageCell {
    Available(PathBuf),
    /// Carries the stored public path, for logging.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Line(String),
    Bullet(String),
    Images(Vec<ImageCell>),
    Spacer(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Top-left corner of grid cell `index`, relative to the grid origin.
pub fn grid_position(index: usize, per_row: usize, cell: f64, spacing: f64) -> (f64, f64) {
    let per_row = per_row.max(1);
    let step = cell + spacing;
    let column = (index % per_row) as f64;
    let row = (index / per_row) as f64;
    (column * step, row * step)
}

/// Lays out the report for `school_name`. Records keep the order they are given in.
pub fn build_report(school_name: &str, records: &[StoredRecord], uploads: &UploadDir) -> Report {
    let title = format!("Report for {school_name}");
    let mut blocks = vec![Block::Title(title.clone())];

    for (number, stored) in (1..).zip(records) {
        let record = &stored.record;
        blocks.push(Block::Heading(format!(
            "{number}. Location: {}",
            record.location
        )));
        blocks.push(Block::Line(format!(
            "Comments : {}",
            record.comments_text().unwrap_or(NO_COMMENTS)
        )));

        let mut faults = record.faults.selected().peekable();
        if faults.peek().is_some() {
            blocks.push(Block::Line("Selected Faults:".to_string()));
            blocks.extend(faults.map(|fault| Block::Bullet(fault.to_string())));
        } else {
            blocks.push(Block::Line(NO_FAULTS.to_string()));
        }

        if record.image_path.is_empty() {
            blocks.push(Block::Line(NO_IMAGES.to_string()));
        } else {
            blocks.push(Block::Line("Images:".to_string()));
            let cells = record
                .image_path
                .iter()
                .map(|path| match uploads.resolve(path) {
                    Some(file) => ImageCell::Available(file),
                    None => ImageCell::Unavailable(path.clone()),
                })
                .collect();
            blocks.push(Block::Images(cells));
        }

        blocks.push(Block::Spacer(SECTION_SPACING_LINES));
    }

    Report { title, blocks }
}
