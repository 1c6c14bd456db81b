//! Renders a [`Report`] to PDF bytes with `lopdf`.
//!
//! Uses the standard Helvetica fonts, so text outside Latin-1 is replaced.
//! Long text is wrapped by an estimated glyph width and content that does
//! not fit on the current page flows onto a new one.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::report::layout::{Report, ReportBlock, RepositoryEntry, StatCell};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const AVATAR_SIZE: f32 = 72.0;
const AVATAR_NAME: &str = "Im1";
/// Avatars larger than this are downscaled before embedding
const AVATAR_PIXELS: u32 = 144;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

type Rgb = (f32, f32, f32);
const INK: Rgb = (0.12, 0.16, 0.23);
const MUTED: Rgb = (0.39, 0.45, 0.55);
const ACCENT: Rgb = (0.31, 0.27, 0.90);
const RULE: Rgb = (0.80, 0.84, 0.88);

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to render PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Render the report as a PDF document
pub fn render_pdf(report: &Report) -> Result<Vec<u8>, ReportError> {
    let avatar = report.blocks.iter().find_map(|block| match block {
        ReportBlock::ProfileCard { avatar: Some(bytes), .. } => AvatarImage::decode(bytes),
        _ => None,
    });

    let mut canvas = Canvas::new();
    for block in &report.blocks {
        canvas.draw_block(block, avatar.as_ref());
    }
    let pages = canvas.finish();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let mut resources = dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    };
    if let Some(image) = &avatar {
        let image_id = doc.add_object(image.to_stream());
        resources.set("XObject", dictionary! { AVATAR_NAME => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id: ObjectId = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Accumulates drawing operations page by page, top to bottom
struct Canvas {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl Canvas {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.new_page();
        self.pages
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.current.is_empty() {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn text(&mut self, x: f32, font: &str, size: f32, color: Rgb, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), self.y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// One line of text at the cursor, advancing it by the line height
    fn line(&mut self, x: f32, font: &str, size: f32, color: Rgb, text: &str) {
        let height = size * 1.4;
        self.ensure_space(height);
        self.y -= size;
        self.text(x, font, size, color, text);
        self.y -= height - size;
    }

    fn paragraph(&mut self, x: f32, width: f32, font: &str, size: f32, color: Rgb, text: &str) {
        for line in wrap(text, max_chars(width, size)) {
            self.line(x, font, size, color, &line);
        }
    }

    fn centered(&mut self, font: &str, size: f32, color: Rgb, text: &str) {
        let x = MARGIN + ((CONTENT_WIDTH - text_width(text, size)) / 2.0).max(0.0);
        self.line(x, font, size, color, text);
    }

    fn rule(&mut self, thickness: f32) {
        self.ensure_space(thickness + 8.0);
        self.y -= 4.0;
        self.current.extend([
            Operation::new("RG", vec![RULE.0.into(), RULE.1.into(), RULE.2.into()]),
            Operation::new("w", vec![thickness.into()]),
            Operation::new("m", vec![MARGIN.into(), self.y.into()]),
            Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), self.y.into()]),
            Operation::new("S", vec![]),
        ]);
        self.y -= 4.0 + thickness;
    }

    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.current.extend([
            Operation::new("RG", vec![RULE.0.into(), RULE.1.into(), RULE.2.into()]),
            Operation::new("w", vec![1.0f32.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn draw_block(&mut self, block: &ReportBlock, avatar: Option<&AvatarImage>) {
        match block {
            ReportBlock::Header { title, generated } => {
                self.centered(BOLD, 24.0, INK, title);
                self.centered(REGULAR, 9.0, MUTED, generated);
                self.gap(12.0);
            }
            ReportBlock::Heading(text) => {
                self.gap(10.0);
                self.ensure_space(60.0);
                self.line(MARGIN, BOLD, 15.0, INK, text);
                self.gap(4.0);
            }
            ReportBlock::ProfileCard { name, handle, bio, .. } => {
                self.profile_card(avatar, name, handle, bio);
            }
            ReportBlock::StatRow(cells) => self.stat_row(cells),
            ReportBlock::LanguageTable(rows) => {
                for (language, percentage) in rows {
                    self.ensure_space(18.0);
                    let baseline = self.y;
                    self.line(MARGIN + 8.0, BOLD, 10.0, INK, language);
                    let after = self.y;
                    self.y = baseline;
                    let x = PAGE_WIDTH - MARGIN - 8.0 - text_width(percentage, 10.0);
                    self.line(x, REGULAR, 10.0, MUTED, percentage);
                    self.y = after;
                    self.rule(0.5);
                }
            }
            ReportBlock::Note(text) => self.paragraph(MARGIN, CONTENT_WIDTH, REGULAR, 9.0, MUTED, text),
            ReportBlock::Repository(entry) => self.repository(entry),
            ReportBlock::Separator => self.rule(0.5),
            ReportBlock::PageBreak => self.new_page(),
            ReportBlock::Footer(text) => {
                self.gap(16.0);
                self.rule(1.0);
                self.centered(REGULAR, 8.0, MUTED, text);
            }
        }
    }

    fn profile_card(&mut self, avatar: Option<&AvatarImage>, name: &str, handle: &str, bio: &str) {
        let top = self.y;
        let text_x = match avatar {
            Some(_) => {
                self.current.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            AVATAR_SIZE.into(),
                            0.into(),
                            0.into(),
                            AVATAR_SIZE.into(),
                            MARGIN.into(),
                            (top - AVATAR_SIZE).into(),
                        ],
                    ),
                    Operation::new("Do", vec![AVATAR_NAME.into()]),
                    Operation::new("Q", vec![]),
                ]);
                MARGIN + AVATAR_SIZE + 16.0
            }
            None => MARGIN,
        };

        let width = PAGE_WIDTH - MARGIN - text_x;
        self.line(text_x, BOLD, 14.0, INK, name);
        self.line(text_x, REGULAR, 10.0, ACCENT, handle);
        self.gap(4.0);
        self.paragraph(text_x, width, REGULAR, 10.0, MUTED, bio);

        if avatar.is_some() {
            self.y = self.y.min(top - AVATAR_SIZE);
        }
        self.gap(12.0);
    }

    fn stat_row(&mut self, cells: &[StatCell; 3]) {
        let height = 54.0;
        self.ensure_space(height);
        let cell_width = CONTENT_WIDTH / 3.0;
        let top = self.y;

        for (i, cell) in cells.iter().enumerate() {
            let x = MARGIN + cell_width * i as f32;
            self.rectangle(x, top - height, cell_width, height);

            self.y = top - 6.0;
            let label_x = x + ((cell_width - text_width(&cell.label, 9.0)) / 2.0).max(4.0);
            self.line(label_x, REGULAR, 9.0, MUTED, &cell.label);
            let value_x = x + ((cell_width - text_width(&cell.value, 16.0)) / 2.0).max(4.0);
            self.line(value_x, BOLD, 16.0, ACCENT, &cell.value);
        }

        self.y = top - height - 8.0;
    }

    fn repository(&mut self, entry: &RepositoryEntry) {
        self.ensure_space(70.0);
        self.line(
            MARGIN,
            BOLD,
            12.0,
            ACCENT,
            &format!("{}. {}", entry.position, entry.name),
        );
        self.line(
            MARGIN,
            REGULAR,
            9.0,
            MUTED,
            &format!(
                "Stars: {}  |  Forks: {}  |  Language: {}",
                entry.stars, entry.forks, entry.language
            ),
        );
        self.paragraph(MARGIN, CONTENT_WIDTH, REGULAR, 10.0, INK, &entry.description);
        self.paragraph(MARGIN, CONTENT_WIDTH, REGULAR, 8.0, ACCENT, &entry.url);
    }
}

/// Avatar decoded to 8-bit RGB, ready to embed as an image XObject
struct AvatarImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl AvatarImage {
    /// Decode any supported format; `None` if the bytes are not an image
    fn decode(bytes: &[u8]) -> Option<Self> {
        let mut image = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!("Skipping undecodable avatar: {}", e);
                return None;
            }
        };
        if image.width() > AVATAR_PIXELS || image.height() > AVATAR_PIXELS {
            image = image.thumbnail(AVATAR_PIXELS, AVATAR_PIXELS);
        }

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        // Flatten transparency onto the white page
        let pixels = rgba
            .pixels()
            .flat_map(|pixel| {
                let [r, g, b, a] = pixel.0;
                let alpha = a as u32;
                [r, g, b].map(|c| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8)
            })
            .collect();

        Some(Self {
            pixels,
            width,
            height,
        })
    }

    fn to_stream(&self) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => self.width as i64,
                "Height" => self.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            self.pixels.clone(),
        )
    }
}

/// WinAnsi bytes for `text`; characters outside Latin-1 become `?`
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ if c.is_whitespace() => b' ',
            _ => b'?',
        })
        .collect()
}

/// Helvetica averages about half an em per glyph
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

fn max_chars(width: f32, size: f32) -> usize {
    ((width / (size * 0.5)) as usize).max(1)
}

/// Greedy word wrap; words longer than a line are split
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
