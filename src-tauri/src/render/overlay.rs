//! Offscreen overlay rasterizer.
//!
//! Takes the encoded source image plus a detection list and produces an
//! annotated PNG of the same natural dimensions. Runs identically for the
//! single-image download and the batch archive; no display surface is
//! involved, and the same inputs always yield byte-identical output.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut, Blend};
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::warn;

use crate::error::OncoscopeError;
use crate::session::types::Detection;

use super::glyph;

/// Annotation sizes are tuned against a 1000 px slide and scale linearly
/// with the larger image dimension.
const REFERENCE_DIM: f64 = 1000.0;
const BASE_STROKE: f64 = 3.0;
const BASE_FONT: f64 = 22.0;
const MIN_FONT: u32 = 8;

const LABEL_PAD_W: u32 = 15;
const LABEL_PAD_H: u32 = 10;
const LABEL_INSET_X: i32 = 7;

const ANNOTATION_RED: Rgba<u8> = Rgba([239, 68, 68, 255]);
const ANNOTATION_FILL: Rgba<u8> = Rgba([239, 68, 68, 77]);
const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Decode `source`, composite all detections on top, return PNG bytes.
///
/// With no detections the result is simply the re-encoded source. The
/// inputs are never mutated.
pub fn render_overlay(source: &[u8], detections: &[Detection]) -> Result<Vec<u8>, OncoscopeError> {
    let decoded = image::load_from_memory(source)
        .map_err(|e| OncoscopeError::Decode(e.to_string()))?;
    let annotated = draw_detections(decoded.to_rgba8(), detections);
    encode_png(annotated)
}

/// Encode a raster as PNG bytes.
pub fn encode_png(img: RgbaImage) -> Result<Vec<u8>, OncoscopeError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| OncoscopeError::Render(e.to_string()))?;
    Ok(buf)
}

/// Draw every detection onto the raster: translucent polygon fill, solid
/// outline, opaque label box at the first vertex.
///
/// Percentage-space coordinates are mapped against the natural dimensions
/// of this raster (`px = x / 100 * width`). A detection without polygon
/// points is skipped; one- or two-point polygons degrade to a labelled
/// point or line instead of failing the render.
pub fn draw_detections(img: RgbaImage, detections: &[Detection]) -> RgbaImage {
    let (width, height) = img.dimensions();
    let scale = width.max(height) as f64 / REFERENCE_DIM;
    let stroke = (BASE_STROKE * scale).max(1.0);
    let font = ((BASE_FONT * scale).round() as u32).max(MIN_FONT);

    let mut canvas = Blend(img);

    for det in detections {
        if det.polygon.is_empty() {
            warn!("Skipping detection '{}' with no polygon points", det.label);
            continue;
        }

        let px_points: Vec<(f64, f64)> = det
            .polygon
            .iter()
            .map(|p| (p[0] / 100.0 * width as f64, p[1] / 100.0 * height as f64))
            .collect();
        let ring = sanitize(
            &px_points
                .iter()
                .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
                .collect::<Vec<_>>(),
        );

        if ring.len() >= 3 {
            draw_polygon_mut(&mut canvas, &ring, ANNOTATION_FILL);
        }
        if ring.len() >= 2 {
            let edges = if ring.len() == 2 { 1 } else { ring.len() };
            for i in 0..edges {
                let j = (i + 1) % ring.len();
                stroke_edge(
                    &mut canvas.0,
                    (ring[i].x as f64, ring[i].y as f64),
                    (ring[j].x as f64, ring[j].y as f64),
                    stroke / 2.0,
                );
            }
        }

        let (ax, ay) = px_points[0];
        draw_label(
            &mut canvas.0,
            &format_label(&det.label, det.confidence),
            ax.round() as i32,
            ay.round() as i32,
            font,
        );
    }

    canvas.0
}

/// Label text exactly as the overlay shows it: upper-cased category plus
/// the confidence with no trailing zeros.
pub fn format_label(label: &str, confidence: f64) -> String {
    format!("{} {}%", label.to_uppercase(), confidence)
}

/// Drop consecutive duplicates and an explicit closing vertex. The
/// polygon filler treats the ring as implicitly closed and rejects a
/// repeated first/last point.
fn sanitize(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut out: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Stroke one polygon edge as a filled quad of the given half-width, with
/// round caps so adjacent edges join without gaps.
fn stroke_edge(img: &mut RgbaImage, p: (f64, f64), q: (f64, f64), half: f64) {
    let radius = half.round().max(1.0) as i32;
    let (dx, dy) = (q.0 - p.0, q.1 - p.1);
    let len = (dx * dx + dy * dy).sqrt();

    if len >= 0.5 {
        let (nx, ny) = (-dy / len * half, dx / len * half);
        let quad = [
            Point::new((p.0 + nx).round() as i32, (p.1 + ny).round() as i32),
            Point::new((q.0 + nx).round() as i32, (q.1 + ny).round() as i32),
            Point::new((q.0 - nx).round() as i32, (q.1 - ny).round() as i32),
            Point::new((p.0 - nx).round() as i32, (p.1 - ny).round() as i32),
        ];
        let quad = sanitize(&quad);
        if quad.len() >= 2 {
            draw_polygon_mut(img, &quad, ANNOTATION_RED);
        }
    }

    draw_filled_circle_mut(img, (p.0.round() as i32, p.1.round() as i32), radius, ANNOTATION_RED);
    draw_filled_circle_mut(img, (q.0.round() as i32, q.1.round() as i32), radius, ANNOTATION_RED);
}

fn draw_label(img: &mut RgbaImage, text: &str, ax: i32, ay: i32, font: u32) {
    let scale = glyph::glyph_scale(font);
    let box_w = glyph::text_width(text, scale) + LABEL_PAD_W;
    let box_h = font + LABEL_PAD_H;
    let top = ay - box_h as i32;

    draw_filled_rect_mut(img, Rect::at(ax, top).of_size(box_w, box_h), ANNOTATION_RED);

    let text_y = top + ((box_h - glyph::text_height(scale)) / 2) as i32;
    glyph::draw_text(img, text, ax + LABEL_INSET_X, text_y, scale, LABEL_TEXT_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("Failed to encode fixture image");
        buf
    }

    fn detection(polygon: Vec<[f64; 2]>) -> Detection {
        Detection {
            label: "pni".to_string(),
            confidence: 80.0,
            polygon,
        }
    }

    fn reference_detection() -> Detection {
        detection(vec![[10.0, 10.0], [20.0, 10.0], [20.0, 20.0], [10.0, 20.0]])
    }

    #[test]
    fn test_reference_polygon_maps_to_exact_pixels() {
        let source = blank_png(1000, 1000);
        let out = render_overlay(&source, &[reference_detection()]).unwrap();
        let rendered = image::load_from_memory(&out).unwrap().to_rgba8();

        // 10% of 1000 = 100: the left edge stroke covers pixel (100, 150).
        assert_eq!(rendered.get_pixel(100, 150), &Rgba([239, 68, 68, 255]));
        // Interior is the translucent fill over black.
        let inside = rendered.get_pixel(150, 150);
        assert!(inside[0] > inside[1] && inside[0] > inside[2] && inside[0] > 50,
            "Interior should be red-tinted, got {:?}", inside);
        assert_eq!(inside[3], 255);
        // Far away from the polygon nothing changed.
        assert_eq!(rendered.get_pixel(500, 500), &Rgba([0, 0, 0, 255]));
        // Label box sits directly above the anchor: top = 100 - 22 - 10.
        assert_eq!(rendered.get_pixel(102, 70), &Rgba([239, 68, 68, 255]));
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = blank_png(640, 480);
        let dets = [reference_detection(), detection(vec![[50.0, 50.0], [60.0, 55.0], [55.0, 60.0]])];
        let first = render_overlay(&source, &dets).unwrap();
        let second = render_overlay(&source, &dets).unwrap();
        assert_eq!(first, second, "Re-rendering must be byte-identical");
    }

    #[test]
    fn test_no_detections_equals_reencoded_source() {
        let source = blank_png(320, 200);
        let rendered = render_overlay(&source, &[]).unwrap();
        let plain = encode_png(image::load_from_memory(&source).unwrap().to_rgba8()).unwrap();
        assert_eq!(rendered, plain);
    }

    #[test]
    fn test_detection_without_points_is_skipped() {
        let source = blank_png(320, 200);
        let rendered = render_overlay(&source, &[detection(Vec::new())]).unwrap();
        let plain = render_overlay(&source, &[]).unwrap();
        assert_eq!(rendered, plain, "A pointless detection must not change the output");
    }

    #[test]
    fn test_single_point_polygon_draws_label_only() {
        let source = blank_png(200, 200);
        let rendered = render_overlay(&source, &[detection(vec![[50.0, 50.0]])]).unwrap();
        let plain = render_overlay(&source, &[]).unwrap();
        assert_ne!(rendered, plain, "The label box should still be drawn");
    }

    #[test]
    fn test_two_point_polygon_strokes_a_line() {
        let source = blank_png(200, 200);
        let out =
            render_overlay(&source, &[detection(vec![[25.0, 50.0], [75.0, 50.0]])]).unwrap();
        let rendered = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(rendered.get_pixel(100, 100), &Rgba([239, 68, 68, 255]));
    }

    #[test]
    fn test_out_of_range_coordinates_clip_without_panic() {
        let source = blank_png(100, 50);
        let det = detection(vec![[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]]);
        let out = render_overlay(&source, &[det]).unwrap();
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn test_duplicate_and_closing_vertices_are_tolerated() {
        let source = blank_png(400, 400);
        // Repeats the first point at the end and doubles a vertex, the way
        // sloppy segmentation output sometimes does.
        let det = detection(vec![
            [10.0, 10.0],
            [40.0, 10.0],
            [40.0, 10.0],
            [40.0, 40.0],
            [10.0, 10.0],
        ]);
        let out = render_overlay(&source, &[det]).unwrap();
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn test_format_label_matches_display_text() {
        assert_eq!(format_label("pni", 80.0), "PNI 80%");
        assert_eq!(format_label("pni", 72.5), "PNI 72.5%");
        assert_eq!(format_label("Nerve", 99.99), "NERVE 99.99%");
    }
}
