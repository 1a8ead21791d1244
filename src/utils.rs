//! Utility helpers used across the application (formatting, text, sprites).
//! Keep helpers small and well-documented for readability.

use image::imageops::FilterType;

use crate::models::DisplayModel;
use crate::ui::SpriteThumb;

pub const THUMB_W: u32 = 48;
pub const THUMB_H: u32 = 48;

/// Format a Pokémon `name` into a human-friendly form.
///
/// Examples: `mr-mime` -> `Mr Mime`, `ho_oh` -> `Ho Oh`.
pub fn format_name(name: &str) -> String {
    let replaced = name.replace('-', " ").replace('_', " ");
    let parts: Vec<String> = replaced
        .split_whitespace()
        .map(|w| {
            let mut chs = w.chars();
            match chs.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chs.as_str().to_lowercase()
                }
            }
        })
        .collect();
    parts.join(" ")
}

pub fn text_to_lines(s: &str, width: usize) -> Vec<String> {
    // Greedy wrap; flavor texts carry raw newlines and form feeds, which
    // split_whitespace folds away.
    let mut lines = vec![];
    let mut current = String::new();
    for word in s.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Plain-text card, used by `--once`.
pub fn card_text(p: &DisplayModel) -> String {
    let mut s = format!("{} (#{})\n", format_name(&p.name), p.id);
    if let Some(img) = &p.image {
        s.push_str(&format!("Image: {}\n", img));
    }
    s.push_str(&format!("HP: {}\n", p.hp));
    s.push_str(&format!("Attack: {}\n", p.attack));
    s.push_str(&format!("Defense: {}\n", p.defense));
    s.push_str(&format!("Special Attack: {}\n", p.special));
    s.push_str(&text_to_lines(&p.description, 60).join("\n"));
    s
}

/// Decode sprite bytes into a compact RGB thumbnail.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<SpriteThumb, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let small = image::imageops::resize(&img.to_rgba8(), THUMB_W, THUMB_H, FilterType::Lanczos3);
    let mut pixels = Vec::with_capacity((THUMB_W * THUMB_H * 3) as usize);
    for p in small.pixels() {
        pixels.extend_from_slice(&[p[0], p[1], p[2]]);
    }
    Ok(SpriteThumb {
        w: THUMB_W,
        h: THUMB_H,
        pixels,
    })
}
