//! Card rasterization.
//!
//! The card is laid out in logical pixels (width [`CARD_WIDTH`]) and painted
//! at `scale` device pixels per logical pixel onto an opaque white canvas.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::CardContent;

pub const CARD_WIDTH: u32 = 640;
/// Tallest capture accepted, in device pixels. Matches the usual canvas
/// limit of 32767 pixels per side.
const MAX_DEVICE_HEIGHT: u32 = 32_767;

const PADDING: u32 = 24;
const COVER_HEIGHT: u32 = 256;
const COLUMN_GAP: u32 = 16;
const FIELD_COLUMN_WIDTH: u32 = (CARD_WIDTH - 2 * PADDING - COLUMN_GAP) / 2;
const FIELD_ROW_GAP: u32 = 16;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];
const HEADER_FROM: [u8; 3] = [0x25, 0x63, 0xEB];
const HEADER_TO: [u8; 3] = [0x4F, 0x46, 0xE5];
const LABEL_COLOR: [u8; 3] = [0x6B, 0x72, 0x80];
const VALUE_COLOR: [u8; 3] = [0x11, 0x18, 0x27];
const BODY_COLOR: [u8; 3] = [0x4B, 0x55, 0x63];
const DIVIDER_COLOR: [u8; 3] = [0xE5, 0xE7, 0xEB];

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    line_height: u32,
    color: [u8; 3],
}

const TITLE: TextStyle = TextStyle {
    size: 24.0,
    line_height: 32,
    color: WHITE,
};
const SUBTITLE: TextStyle = TextStyle {
    size: 16.0,
    line_height: 24,
    color: WHITE,
};
const LABEL: TextStyle = TextStyle {
    size: 14.0,
    line_height: 20,
    color: LABEL_COLOR,
};
const VALUE: TextStyle = TextStyle {
    size: 16.0,
    line_height: 24,
    color: VALUE_COLOR,
};
const HEADING: TextStyle = TextStyle {
    size: 18.0,
    line_height: 28,
    color: VALUE_COLOR,
};
const BODY: TextStyle = TextStyle {
    size: 16.0,
    line_height: 24,
    color: BODY_COLOR,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("cover photo {url} could not be loaded: {reason}")]
    CoverUnavailable { url: String, reason: String },
    #[error("cover photo could not be decoded: {0}")]
    CoverDecode(String),
    #[error("invalid scale factor {0}")]
    InvalidScale(u32),
    #[error("snapshot of {width}x{height} pixels is too large")]
    TooLarge { width: u32, height: u32 },
}

/// Anything that can be rasterized into an image.
pub trait SnapshotSource: Send + Sync {
    fn capture(&self, scale: u32) -> Result<RgbaImage, CaptureError>;
}

/// Cover photo as it arrived from the network.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CoverSource {
    #[default]
    None,
    Bytes(Vec<u8>),
    Unavailable { url: String, reason: String },
}

pub fn load_font(path: &Path) -> Result<FontVec, String> {
    let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
    FontVec::try_from_vec(bytes).map_err(|err| err.to_string())
}

pub struct CardSnapshot {
    content: CardContent,
    cover: CoverSource,
    font: Option<Arc<FontVec>>,
}

impl CardSnapshot {
    pub fn new(content: CardContent, cover: CoverSource, font: Option<Arc<FontVec>>) -> Self {
        Self {
            content,
            cover,
            font,
        }
    }

    fn decode_cover(&self, width: u32, height: u32) -> Result<Option<RgbaImage>, CaptureError> {
        match &self.cover {
            CoverSource::None => Ok(None),
            CoverSource::Unavailable { url, reason } => Err(CaptureError::CoverUnavailable {
                url: url.clone(),
                reason: reason.clone(),
            }),
            CoverSource::Bytes(bytes) => {
                let decoded = image::load_from_memory(bytes)
                    .map_err(|err| CaptureError::CoverDecode(err.to_string()))?;
                Ok(Some(
                    decoded
                        .resize_to_fill(width, height, FilterType::Triangle)
                        .to_rgba8(),
                ))
            }
        }
    }
}

impl SnapshotSource for CardSnapshot {
    fn capture(&self, scale: u32) -> Result<RgbaImage, CaptureError> {
        if scale == 0 {
            return Err(CaptureError::InvalidScale(scale));
        }
        let text = TextPainter {
            font: self.font.as_deref(),
            scale,
        };
        let layout = Layout::compute(&self.content, !matches!(self.cover, CoverSource::None), &text);

        let width = CARD_WIDTH * scale;
        let height = layout.total_height.saturating_mul(scale);
        if height > MAX_DEVICE_HEIGHT {
            return Err(CaptureError::TooLarge { width, height });
        }

        let cover = self.decode_cover(width, layout.cover_height * scale)?;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let mut y = 0;

        if let Some(cover) = cover {
            image::imageops::overlay(&mut canvas, &cover, 0, 0);
            shade_cover(&mut canvas, layout.cover_height * scale);
            y += layout.cover_height;
        }

        // Header band.
        fill_horizontal_gradient(
            &mut canvas,
            y * scale,
            layout.header_height * scale,
            HEADER_FROM,
            HEADER_TO,
        );
        let mut cursor = y + PADDING;
        for line in &layout.title_lines {
            text.draw(&mut canvas, line, PADDING, cursor, TITLE);
            cursor += TITLE.line_height;
        }
        if !layout.subtitle_lines.is_empty() {
            cursor += 8;
            for line in &layout.subtitle_lines {
                text.draw(&mut canvas, line, PADDING, cursor, SUBTITLE);
                cursor += SUBTITLE.line_height;
            }
        }
        y += layout.header_height;

        // Labeled fields, two per row; a row is as tall as its longest value.
        y += PADDING;
        for (row, height) in layout.field_row_heights.iter().enumerate() {
            for column in 0..2 {
                let index = row * 2 + column;
                let Some(field) = self.content.fields.get(index) else {
                    break;
                };
                let x = PADDING + column as u32 * (FIELD_COLUMN_WIDTH + COLUMN_GAP);
                text.draw(&mut canvas, &field.label, x, y, LABEL);
                let mut line_top = y + LABEL.line_height;
                for line in &layout.field_values[index] {
                    text.draw(&mut canvas, line, x, line_top, VALUE);
                    line_top += VALUE.line_height;
                }
            }
            y += height;
        }

        if let Some(heading) = &self.content.body_heading {
            text.draw(&mut canvas, heading, PADDING, y, HEADING);
            y += HEADING.line_height + 8;
        }
        for line in &layout.body_lines {
            text.draw(&mut canvas, line, PADDING, y, BODY);
            y += BODY.line_height;
        }

        y += 16;
        fill_rect(
            &mut canvas,
            PADDING * scale,
            y * scale,
            (CARD_WIDTH - 2 * PADDING) * scale,
            scale,
            DIVIDER_COLOR,
        );

        Ok(canvas)
    }
}

struct Layout {
    cover_height: u32,
    header_height: u32,
    title_lines: Vec<String>,
    subtitle_lines: Vec<String>,
    field_values: Vec<Vec<String>>,
    field_row_heights: Vec<u32>,
    body_lines: Vec<String>,
    total_height: u32,
}

impl Layout {
    fn compute(content: &CardContent, has_cover: bool, text: &TextPainter<'_>) -> Self {
        let inner_width = (CARD_WIDTH - 2 * PADDING) as f32;
        let title_lines = text.wrap(&content.title, TITLE.size, inner_width);
        let subtitle_lines = text.wrap(&content.subtitle, SUBTITLE.size, inner_width);
        let body_lines = text.wrap(&content.body, BODY.size, inner_width);

        let cover_height = if has_cover { COVER_HEIGHT } else { 0 };
        let mut header_height = PADDING * 2 + title_lines.len() as u32 * TITLE.line_height;
        if !subtitle_lines.is_empty() {
            header_height += 8 + subtitle_lines.len() as u32 * SUBTITLE.line_height;
        }
        let field_values: Vec<Vec<String>> = content
            .fields
            .iter()
            .map(|field| text.wrap(&field.value, VALUE.size, FIELD_COLUMN_WIDTH as f32))
            .collect();
        let field_row_heights: Vec<u32> = field_values
            .chunks(2)
            .map(|pair| {
                let lines = pair.iter().map(Vec::len).max().unwrap_or(0).max(1) as u32;
                LABEL.line_height + lines * VALUE.line_height + FIELD_ROW_GAP
            })
            .collect();

        let mut body_height = PADDING + field_row_heights.iter().sum::<u32>();
        if content.body_heading.is_some() {
            body_height += HEADING.line_height + 8;
        }
        body_height += body_lines.len() as u32 * BODY.line_height;
        // Divider plus bottom padding.
        body_height += 16 + 1 + PADDING;

        Self {
            cover_height,
            header_height,
            title_lines,
            subtitle_lines,
            field_values,
            field_row_heights,
            body_lines,
            total_height: cover_height + header_height + body_height,
        }
    }
}

struct TextPainter<'a> {
    font: Option<&'a FontVec>,
    scale: u32,
}

impl TextPainter<'_> {
    /// Width in logical pixels. Without a font, an average glyph width is assumed.
    fn measure(&self, text: &str, size: f32) -> f32 {
        let Some(font) = self.font else {
            return text.chars().count() as f32 * size * 0.55;
        };
        let scaled = font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    /// Greedy word wrap. Explicit newlines start a new line; a word wider
    /// than `max_width` is broken between characters.
    fn wrap(&self, text: &str, size: f32, max_width: f32) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let mut lines = Vec::new();
        for paragraph in trimmed.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                for piece in self.break_word(word, size, max_width) {
                    if current.is_empty() {
                        current = piece;
                        continue;
                    }
                    let candidate = format!("{current} {piece}");
                    if self.measure(&candidate, size) <= max_width {
                        current = candidate;
                    } else {
                        lines.push(std::mem::replace(&mut current, piece));
                    }
                }
            }
            lines.push(current);
        }
        lines
    }

    fn break_word(&self, word: &str, size: f32, max_width: f32) -> Vec<String> {
        if self.measure(word, size) <= max_width {
            return vec![word.to_string()];
        }
        let mut pieces = Vec::new();
        let mut piece = String::new();
        for c in word.chars() {
            piece.push(c);
            if piece.chars().count() > 1 && self.measure(&piece, size) > max_width {
                piece.pop();
                pieces.push(std::mem::take(&mut piece));
                piece.push(c);
            }
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: u32, top: u32, style: TextStyle) {
        let Some(font) = self.font else {
            return;
        };
        let scale = self.scale as f32;
        let scaled = font.as_scaled(PxScale::from(style.size * scale));
        let baseline = top as f32 * scale
            + (style.line_height as f32 * scale - scaled.height()) / 2.0
            + scaled.ascent();
        let mut caret = x as f32 * scale;
        let mut previous = None;
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
                    return;
                }
                blend(canvas.get_pixel_mut(px as u32, py as u32), style.color, coverage);
            });
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    for (channel, target) in pixel.0.iter_mut().zip(color) {
        *channel = (*channel as f32 * (1.0 - alpha) + target as f32 * alpha).round() as u8;
    }
    pixel.0[3] = 255;
}

fn lerp(from: [u8; 3], to: [u8; 3], t: f32) -> [u8; 3] {
    let mut out = [0; 3];
    for i in 0..3 {
        out[i] = (from[i] as f32 + (to[i] as f32 - from[i] as f32) * t).round() as u8;
    }
    out
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: [u8; 3]) {
    let x_end = (x + width).min(canvas.width());
    let y_end = (y + height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, Rgba([color[0], color[1], color[2], 255]));
        }
    }
}

fn fill_horizontal_gradient(canvas: &mut RgbaImage, y: u32, height: u32, from: [u8; 3], to: [u8; 3]) {
    let width = canvas.width();
    let span = width.saturating_sub(1).max(1) as f32;
    for px in 0..width {
        let color = lerp(from, to, px as f32 / span);
        fill_rect(canvas, px, y, 1, height, color);
    }
}

/// Darken the lower half of the cover, 60% black at the bottom edge fading
/// to nothing at the middle.
fn shade_cover(canvas: &mut RgbaImage, height: u32) {
    let height = height.min(canvas.height());
    if height == 0 {
        return;
    }
    for py in 0..height {
        let from_bottom = (height - 1 - py) as f32 / height as f32;
        let alpha = 0.6 * (1.0 - from_bottom / 0.5);
        if alpha <= 0.0 {
            continue;
        }
        for px in 0..canvas.width() {
            blend(canvas.get_pixel_mut(px, py), BLACK, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CardField;

    fn content() -> CardContent {
        CardContent {
            title: "Clean Water".to_string(),
            subtitle: "Nairobi".to_string(),
            fields: vec![
                CardField::new("Company", "WaterCo"),
                CardField::new("Host LC", "Nairobi"),
                CardField::new("SDG Targets", "6.1, 6.2"),
            ],
            body_heading: Some("Project Description".to_string()),
            body: "Build wells.".to_string(),
            cover_url: None,
        }
    }

    fn png_cover(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn capture_is_scaled_with_white_background() {
        let snapshot = CardSnapshot::new(content(), CoverSource::None, None);
        let one = snapshot.capture(1).unwrap();
        let two = snapshot.capture(2).unwrap();

        assert_eq!(one.width(), CARD_WIDTH);
        assert_eq!(two.width(), CARD_WIDTH * 2);
        assert_eq!(two.height(), one.height() * 2);
        // Bottom-right corner is body padding: white and opaque.
        assert_eq!(*two.get_pixel(two.width() - 1, two.height() - 1), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn header_gradient_runs_blue_to_indigo() {
        let snapshot = CardSnapshot::new(content(), CoverSource::None, None);
        let img = snapshot.capture(1).unwrap();

        let left = img.get_pixel(0, 1).0;
        let right = img.get_pixel(img.width() - 1, 1).0;
        assert_eq!(&left[..3], &HEADER_FROM);
        assert_eq!(&right[..3], &HEADER_TO);
    }

    #[test]
    fn cover_adds_section_and_is_shaded_at_the_bottom() {
        let without = CardSnapshot::new(content(), CoverSource::None, None)
            .capture(1)
            .unwrap();
        let with = CardSnapshot::new(content(), CoverSource::Bytes(png_cover(8, 4)), None)
            .capture(1)
            .unwrap();

        assert_eq!(with.height(), without.height() + COVER_HEIGHT);
        let top = with.get_pixel(10, 0).0;
        let bottom = with.get_pixel(10, COVER_HEIGHT - 1).0;
        assert!(top[0] > 190 && top[1] < 20);
        assert!(bottom[0] < top[0]);
    }

    #[test]
    fn unavailable_cover_fails_capture() {
        let snapshot = CardSnapshot::new(
            content(),
            CoverSource::Unavailable {
                url: "https://cdn.example.com/x.jpg".to_string(),
                reason: "http status 403".to_string(),
            },
            None,
        );
        assert!(matches!(
            snapshot.capture(2),
            Err(CaptureError::CoverUnavailable { .. })
        ));
    }

    #[test]
    fn undecodable_cover_fails_capture() {
        let snapshot = CardSnapshot::new(content(), CoverSource::Bytes(b"not an image".to_vec()), None);
        assert!(matches!(snapshot.capture(2), Err(CaptureError::CoverDecode(_))));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let snapshot = CardSnapshot::new(content(), CoverSource::None, None);
        assert_eq!(snapshot.capture(0).unwrap_err(), CaptureError::InvalidScale(0));
    }

    #[test]
    fn wrap_respects_newlines_and_width() {
        let painter = TextPainter {
            font: None,
            scale: 1,
        };
        let lines = painter.wrap("one two three\n\nfour", 10.0, 5.5 * 8.0);
        assert_eq!(lines, vec!["one two", "three", "", "four"]);
        assert!(painter.wrap("   ", 10.0, 100.0).is_empty());
    }

    #[test]
    fn wrap_breaks_words_wider_than_the_line() {
        let painter = TextPainter {
            font: None,
            scale: 1,
        };
        // 8 glyphs of 5.5 px fit in 45 px.
        let lines = painter.wrap("ab abcdefghijklmnopqrst", 10.0, 45.0);
        assert_eq!(lines, vec!["ab", "abcdefgh", "ijklmnop", "qrst"]);
    }

    #[test]
    fn long_field_values_wrap_inside_their_column() {
        let painter = TextPainter {
            font: None,
            scale: 1,
        };
        let mut card = content();
        card.fields[0].value =
            "International Water and Sanitation Partnership of East Africa Limited".to_string();
        let short = Layout::compute(&content(), false, &painter);
        let long = Layout::compute(&card, false, &painter);

        assert!(long.field_values[0].len() >= 3);
        for line in &long.field_values[0] {
            assert!(painter.measure(line, VALUE.size) <= FIELD_COLUMN_WIDTH as f32);
        }
        let extra = (long.field_values[0].len() as u32 - 1) * VALUE.line_height;
        assert_eq!(long.field_row_heights[0], short.field_row_heights[0] + extra);
        assert_eq!(long.field_row_heights[1], short.field_row_heights[1]);
        assert_eq!(long.total_height, short.total_height + extra);
    }

    #[test]
    fn long_description_still_exports_at_double_scale() {
        let mut card = content();
        card.body = "Volunteers will support local schools in the region. ".repeat(450);
        let img = CardSnapshot::new(card, CoverSource::None, None)
            .capture(2)
            .unwrap();

        assert_eq!(img.width(), CARD_WIDTH * 2);
        assert!(img.height() > 16_384);
        assert!(img.height() <= MAX_DEVICE_HEIGHT);
    }

    #[test]
    fn card_beyond_canvas_limit_is_too_large() {
        let mut card = content();
        card.body = "Volunteers will support local schools in the region. ".repeat(1200);
        let err = CardSnapshot::new(card, CoverSource::None, None)
            .capture(2)
            .unwrap_err();

        assert!(matches!(err, CaptureError::TooLarge { width: 1280, height } if height > MAX_DEVICE_HEIGHT));
    }

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(lerp(HEADER_FROM, HEADER_TO, 0.0), HEADER_FROM);
        assert_eq!(lerp(HEADER_FROM, HEADER_TO, 1.0), HEADER_TO);
    }
}
