use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::ir::{DrawCommand, ForestScene, TextAnchor};
use crate::theme::LineType;

/// Rasterize a scene and encode it as PNG.
pub fn render_png(scene: &ForestScene) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; (scene.width * scene.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Render a scene as an SVG document.
pub fn render_svg(scene: &ForestScene) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn rgb(color: (u8, u8, u8)) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn px(point: (f64, f64)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

fn draw_scene<DB>(root: &DrawingArea<DB, Shift>, scene: &ForestScene) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&rgb(scene.background)).context("Failed to fill background")?;

    for command in &scene.commands {
        match command {
            DrawCommand::DrawLine { from, to, color, width, line_type } => {
                let style = rgb(*color).stroke_width(width.round().max(1.0) as u32);
                for (a, b) in dash_segments(*from, *to, *line_type) {
                    root.draw(&PathElement::new(vec![px(a), px(b)], style))
                        .context("Failed to draw line")?;
                }
            }
            DrawCommand::DrawMarker { center, size, color } => {
                let half = size / 2.0;
                let (x, y) = *center;
                root.draw(&Rectangle::new(
                    [px((x - half, y - half)), px((x + half, y + half))],
                    rgb(*color).filled(),
                ))
                .context("Failed to draw marker")?;
            }
            DrawCommand::DrawArrow { tip, pointing_right, size, color } => {
                let (x, y) = *tip;
                let back = if *pointing_right { x - size } else { x + size };
                let half = size / 2.0;
                root.draw(&Polygon::new(
                    vec![px((x, y)), px((back, y - half)), px((back, y + half))],
                    rgb(*color).filled(),
                ))
                .context("Failed to draw arrow")?;
            }
            DrawCommand::DrawText { position, text, size, anchor, color } => {
                let h_pos = match anchor {
                    TextAnchor::Start => HPos::Left,
                    TextAnchor::Middle => HPos::Center,
                    TextAnchor::End => HPos::Right,
                };
                let style = ("sans-serif", *size)
                    .into_font()
                    .color(&rgb(*color))
                    .pos(Pos::new(h_pos, VPos::Center));
                root.draw(&Text::new(text.clone(), px(*position), style))
                    .context("Failed to draw text")?;
            }
        }
    }

    Ok(())
}

/// Split a line into the visible pieces of its dash pattern.
fn dash_segments(from: (f64, f64), to: (f64, f64), line_type: LineType) -> Vec<((f64, f64), (f64, f64))> {
    let Some((on, off)) = line_type.dash_pattern() else {
        return vec![(from, to)];
    };
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return vec![(from, to)];
    }

    let at = |t: f64| (from.0 + dx * t / length, from.1 + dy * t / length);
    let mut segments = Vec::new();
    let mut t = 0.0;
    while t < length {
        let end = (t + on).min(length);
        segments.push((at(t), at(end)));
        t = end + off;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> ForestScene {
        ForestScene {
            width: 120,
            height: 80,
            background: (255, 255, 255),
            commands: vec![
                DrawCommand::DrawLine {
                    from: (10.0, 10.0),
                    to: (10.0, 70.0),
                    color: (0, 0, 0),
                    width: 1.0,
                    line_type: LineType::Dashed,
                },
                DrawCommand::DrawMarker { center: (60.0, 40.0), size: 6.0, color: (33, 33, 33) },
                DrawCommand::DrawArrow { tip: (110.0, 40.0), pointing_right: true, size: 6.0, color: (0, 0, 0) },
            ],
        }
    }

    #[test]
    fn test_solid_line_is_one_segment() {
        assert_eq!(dash_segments((0.0, 0.0), (0.0, 50.0), LineType::Solid).len(), 1);
    }

    #[test]
    fn test_dashed_line_segments() {
        let segments = dash_segments((0.0, 0.0), (0.0, 20.0), LineType::Dashed);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], ((0.0, 0.0), (0.0, 6.0)));
        assert_eq!(segments[1], ((0.0, 10.0), (0.0, 16.0)));
    }

    #[test]
    fn test_render_png_signature() {
        let bytes = render_png(&scene()).unwrap();
        assert_eq!(&bytes[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_render_svg_root() {
        let bytes = render_svg(&scene()).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
    }
}
