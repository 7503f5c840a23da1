//! Deterministic text rasterization for overlay labels.
//!
//! Labels are burned into exported images with the classic 8x8 bitmap font,
//! scaled by whole pixels (nearest neighbour). No font files, no hinting,
//! no platform text stack, so the same label always produces the same
//! bytes on every machine.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

/// Native glyph cell size of the bitmap font.
pub const GLYPH_DIM: u32 = 8;

/// Whole-pixel magnification that best matches a requested font height.
pub fn glyph_scale(font_px: u32) -> u32 {
    ((font_px + GLYPH_DIM / 2) / GLYPH_DIM).max(1)
}

/// Rendered width of `text` at the given magnification. The font is
/// monospace, so this is exact, not an estimate.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_DIM * scale
}

/// Rendered height of any text at the given magnification.
pub fn text_height(scale: u32) -> u32 {
    GLYPH_DIM * scale
}

/// Blit `text` with its top-left corner at (x, y). Pixels outside the
/// image are dropped. Characters outside the basic ASCII table render
/// as '?'.
pub fn draw_text(img: &mut RgbaImage, text: &str, x: i32, y: i32, scale: u32, color: Rgba<u8>) {
    let (width, height) = img.dimensions();
    let mut pen_x = x;
    for ch in text.chars() {
        let glyph = glyph_for(ch);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_DIM {
                if bits & (1 << col) == 0 {
                    continue;
                }
                // One font pixel becomes a scale x scale block.
                let px0 = pen_x + (col * scale) as i32;
                let py0 = y + (row as u32 * scale) as i32;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = px0 + dx as i32;
                        let py = py0 + dy as i32;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            img.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
        pen_x += (GLYPH_DIM * scale) as i32;
    }
}

fn glyph_for(ch: char) -> [u8; 8] {
    let idx = ch as usize;
    if idx < BASIC_LEGACY.len() {
        BASIC_LEGACY[idx]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_scale_rounds_to_nearest_cell_multiple() {
        assert_eq!(glyph_scale(8), 1);
        assert_eq!(glyph_scale(11), 1);
        assert_eq!(glyph_scale(12), 2);
        assert_eq!(glyph_scale(22), 3);
        // Tiny requested sizes still draw something.
        assert_eq!(glyph_scale(1), 1);
    }

    #[test]
    fn test_text_width_is_monospace() {
        assert_eq!(text_width("AB", 1), 16);
        assert_eq!(text_width("AB", 2), 32);
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("PNI 80%", 1), 7 * 8);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut img = RgbaImage::from_pixel(32, 16, Rgba([0, 0, 0, 255]));
        let white = Rgba([255, 255, 255, 255]);
        draw_text(&mut img, "X", 2, 2, 1, white);

        let lit = img.pixels().filter(|p| p[0] == 255).count();
        assert!(lit > 0, "Expected some glyph pixels to be drawn");
        assert!(lit < 64, "An 8x8 glyph cannot fill more than its cell");
    }

    #[test]
    fn test_draw_text_clips_at_image_bounds() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let white = Rgba([255, 255, 255, 255]);
        // Partially and fully off-canvas draws must not panic.
        draw_text(&mut img, "WW", -4, -4, 2, white);
        draw_text(&mut img, "W", 100, 100, 1, white);
    }

    #[test]
    fn test_non_ascii_falls_back_to_question_mark() {
        let mut a = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let mut b = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let white = Rgba([255, 255, 255, 255]);
        draw_text(&mut a, "é", 0, 0, 1, white);
        draw_text(&mut b, "?", 0, 0, 1, white);
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
