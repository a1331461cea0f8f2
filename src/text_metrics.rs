use crate::config::MeasureConfig;
use crate::layout::Size;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|\\n|\n").unwrap());

/// Size of an item card holding `label`, label padding included.
pub fn measure_item(label: &str, config: &MeasureConfig) -> Size {
    let lines = split_label_lines(label);
    let text_width = lines
        .iter()
        .map(|line| text_width(line, config))
        .fold(0.0f32, f32::max);
    let text_height = lines.len().max(1) as f32 * config.font_size * config.line_height;

    let width = (text_width + 2.0 * config.label_padding_x).ceil() as i32;
    let height = (text_height + 2.0 * config.label_padding_y).ceil() as i32;
    Size::new(width.max(config.min_item_width), height)
}

pub fn split_label_lines(label: &str) -> Vec<String> {
    LINE_BREAK_RE
        .split(label)
        .map(|line| line.trim().to_string())
        .collect()
}

fn text_width(text: &str, config: &MeasureConfig) -> f32 {
    if config.fast_text_metrics {
        return fallback_text_width(text, config.font_size);
    }
    measure_text_width(text, config.font_size, &config.font_family)
        .unwrap_or_else(|| fallback_text_width(text, config.font_size))
}

/// Width from the first installed font matching `font_family`, or `None`
/// when no usable face is found.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

pub fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Approximate advance of `ch` at a 1px font size, for a typical sans-serif.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | 'I' | '\'' | '|' => 0.25,
        '.' | ',' | ':' | ';' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '\\' | '/' => 0.32,
        'f' | 'r' | 't' => 0.34,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.95,
        'a'..='z' => 0.57,
        'A'..='Z' => 0.67,
        '0'..='9' => 0.60,
        _ if ch.is_ascii() => 0.57,
        // CJK and other wide scripts.
        _ => 1.0,
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(&family_key);
            if face.is_none() {
                tracing::debug!(
                    family = %family_key,
                    "no installed font matched, using width table"
                );
            }
            self.cache.insert(family_key.clone(), face);
        }
        let face = self.cache.get_mut(&family_key)?.as_mut()?;
        face.measure_width(&text.replace('\t', "    "), font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|&name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::new(data.to_vec(), index))
            .flatten()
    }
}

/// Owned font bytes plus the advances looked up so far.
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let mut width = 0.0f32;
        let mut face: Option<Face<'_>> = None;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else if let Some(cached) = self.advance_cache.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Some(Face::parse(&self.data, self.index).ok()?);
                }
                let advance = face
                    .as_ref()
                    .and_then(|face| face.glyph_index(ch))
                    .and_then(|glyph| face.as_ref()?.glyph_hor_advance(glyph));
                self.advance_cache.insert(ch, advance);
                advance
            };
            width += match advance {
                Some(advance) => advance as f32 * scale,
                None => char_width_factor(ch) * font_size,
            };
        }

        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> MeasureConfig {
        MeasureConfig {
            fast_text_metrics: true,
            ..MeasureConfig::default()
        }
    }

    #[test]
    fn split_label_lines_handles_breaks() {
        assert_eq!(split_label_lines("a<br/>b"), vec!["a", "b"]);
        assert_eq!(split_label_lines("a<BR>b"), vec!["a", "b"]);
        assert_eq!(split_label_lines("a\\nb"), vec!["a", "b"]);
        assert_eq!(split_label_lines("  one \n two "), vec!["one", "two"]);
    }

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w16 = fallback_text_width("Hello", 16.0);
        let w32 = fallback_text_width("Hello", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01);
    }

    #[test]
    fn measured_item_includes_label_padding() {
        let size = measure_item("", &fast());
        assert_eq!(size, Size::new(32, 56));

        let two_lines = measure_item("a<br>b", &fast());
        assert_eq!(two_lines.height, 80);
        assert!(two_lines.width > 32);
    }

    #[test]
    fn min_width_is_respected() {
        let config = MeasureConfig {
            min_item_width: 100,
            ..fast()
        };
        assert_eq!(measure_item("x", &config).width, 100);
    }

    #[test]
    fn wider_labels_measure_wider() {
        let short = measure_item("Node", &fast());
        let long = measure_item("A considerably longer node label", &fast());
        assert!(long.width > short.width);
        assert_eq!(long.height, short.height);
    }
}
