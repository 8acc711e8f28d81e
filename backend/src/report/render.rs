use super::{
    grid_position, Block, ImageCell, RenderError, Report, CELL_MM, IMAGES_PER_ROW,
    IMAGE_UNAVAILABLE, SPACING_MM,
};
use genpdf::elements::{Break, Image as PdfImage, Paragraph};
use genpdf::render::Area;
use genpdf::style::Style;
use genpdf::{Alignment, Context, Document, Element, Mm, Position, RenderResult, Size};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use log::warn;
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::error::Error;
use std::path::Path;
use tempfile::NamedTempFile;

const IMAGE_DPI: f64 = 150.0;
const MARGIN_MM: i32 = 15;
const TITLE_FONT_SIZE: u8 = 22;
const HEADING_FONT_SIZE: u8 = 14;
const BODY_FONT_SIZE: u8 = 11;

/// Renders a laid-out report into PDF bytes.
///
/// Blocking: decodes images and writes temporary files, so call it from the
/// blocking pool.
pub fn render_report(report: Report, fonts_dir: &Path) -> Result<Vec<u8>, RenderError> {
    let mut doc = configure_document(fonts_dir, &report.title)?;

    // genpdf reads images from disk; keep the re-encoded copies alive until render.
    let mut temp_files: Vec<NamedTempFile> = Vec::new();

    for block in report.blocks {
        match block {
            Block::Title(text) => doc.push(
                Paragraph::new(text)
                    .aligned(Alignment::Center)
                    .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
            ),
            Block::Heading(text) => {
                doc.push(Break::new(1));
                doc.push(
                    Paragraph::new(text).styled(Style::new().bold().with_font_size(HEADING_FONT_SIZE)),
                );
            }
            Block::Line(text) => doc.push(Paragraph::new(text)),
            Block::Bullet(text) => doc.push(Paragraph::new(format!("- {text}"))),
            Block::Images(cells) => {
                let cells = cells
                    .into_iter()
                    .map(|cell| prepare_cell(cell, &mut temp_files))
                    .collect();
                doc.push(Break::new(0.5));
                doc.push(ImageGrid::new(cells));
            }
            Block::Spacer(lines) => doc.push(Break::new(lines)),
        }
    }

    let mut out = Vec::new();
    doc.render(&mut out)?;
    Ok(out)
}

/// Load the font family: Arial or LiberationSans if present, else the
/// DejaVuSans family shipped with the backend.
fn load_font(
    fonts_dir: &Path,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, RenderError> {
    genpdf::fonts::from_files(fonts_dir, "Arial", None)
        .or_else(|_| genpdf::fonts::from_files(fonts_dir, "LiberationSans", None))
        .or_else(|_| genpdf::fonts::from_files(fonts_dir, "DejaVuSans", None))
        .map_err(|source| RenderError::Font {
            dir: fonts_dir.to_path_buf(),
            source,
        })
}

fn configure_document(fonts_dir: &Path, title: &str) -> Result<Document, RenderError> {
    let mut doc = Document::new(load_font(fonts_dir)?);
    doc.set_title(title);
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.25);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

enum GridCell {
    Picture(PdfImage),
    Notice(Paragraph),
}

fn notice() -> GridCell {
    GridCell::Notice(Paragraph::new(IMAGE_UNAVAILABLE))
}

fn prepare_cell(cell: ImageCell, temp_files: &mut Vec<NamedTempFile>) -> GridCell {
    match cell {
        ImageCell::Available(path) => match prepare_image(&path, temp_files) {
            Ok(image) => GridCell::Picture(image),
            Err(e) => {
                warn!("Could not prepare image {}: {}", path.display(), e);
                notice()
            }
        },
        ImageCell::Unavailable(public_path) => {
            warn!("Image not found at path: {}", public_path);
            notice()
        }
    }
}

/// Loads an image, scales it down to fit one grid cell, flattens any alpha
/// channel over white and re-encodes it as an RGB PNG genpdf can embed.
fn prepare_image(
    path: &Path,
    temp_files: &mut Vec<NamedTempFile>,
) -> Result<PdfImage, Box<dyn Error>> {
    let img = image::open(path)?;
    let (orig_w, orig_h) = img.dimensions();

    let cell_px = (CELL_MM / 25.4 * IMAGE_DPI).floor();
    let scale = (cell_px / orig_w as f64)
        .min(cell_px / orig_h as f64)
        .min(1.0);

    let resized: DynamicImage = if scale >= 1.0 {
        img
    } else {
        let new_w = (orig_w as f64 * scale).floor().max(1.0) as u32;
        let new_h = (orig_h as f64 * scale).floor().max(1.0) as u32;
        img.resize(new_w, new_h, FilterType::Lanczos3)
    };

    let rgba = resized.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    let raw = DynamicImage::ImageRgba8(background).to_rgb8().into_raw();

    let mut tmp = NamedTempFile::new()?;
    {
        let mut encoder = PngEncoder::new(tmp.as_file_mut(), w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&raw)?;
    }

    let mut pdf_image = PdfImage::from_path(tmp.path())?;
    pdf_image.set_dpi(IMAGE_DPI);
    pdf_image.set_alignment(Alignment::Center);
    temp_files.push(tmp);
    Ok(pdf_image)
}

/// Places cells on a fixed grid, `IMAGES_PER_ROW` to a row. A row that does not
/// fit on the current page moves whole to the next one.
struct ImageGrid {
    cells: Vec<GridCell>,
    next: usize,
}

impl ImageGrid {
    fn new(cells: Vec<GridCell>) -> Self {
        Self { cells, next: 0 }
    }
}

impl Element for ImageGrid {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        style: Style,
    ) -> Result<RenderResult, genpdf::error::Error> {
        let mut result = RenderResult::default();
        let first_on_page = self.next;
        let mut bottom = 0.0;

        while self.next < self.cells.len() {
            let local = self.next - first_on_page;
            let (x, y) = grid_position(local, IMAGES_PER_ROW, CELL_MM, SPACING_MM);
            if local % IMAGES_PER_ROW == 0 && Mm::from(y + CELL_MM) > area.size().height {
                result.has_more = true;
                break;
            }

            let mut cell_area = area.clone();
            cell_area.add_offset(Position::new(x, y));
            cell_area.set_size(Size::new(CELL_MM, CELL_MM));
            match &mut self.cells[self.next] {
                GridCell::Picture(image) => image.render(context, cell_area, style)?,
                GridCell::Notice(paragraph) => paragraph.render(context, cell_area, style)?,
            };

            bottom = y + CELL_MM;
            self.next += 1;
        }

        result.size = Size::new(area.size().width, bottom);
        Ok(result)
    }
}
