//! Detection outline rendering

use image::{ImageBuffer, Pixel, Rgb, Rgba};
use imageproc::definitions::Image;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut, Canvas,
};
use imageproc::point::Point as PixelPoint;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::raster::{ChannelOrder, PixelBuffer};
use crate::vision::detection::{Detection, Point};

/// Coordinates are clamped to this magnitude before rasterization so the
/// drawing primitives never overflow `i32` arithmetic.
const COORD_LIMIT: f64 = (1 << 20) as f64;

/// Outline color and stroke width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Outline color as (R, G, B)
    pub line_color: [u8; 3],
    /// Stroke width in pixels
    pub line_thickness: i32,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            line_color: [0, 255, 0],
            line_thickness: 2,
        }
    }
}

/// Draw a closed outline around every detection polygon
///
/// Each outline connects the four corners in engine order and closes back to
/// the first corner. `color` is given as RGB and written in the buffer's own
/// channel order; on 4-channel buffers outlines are fully opaque. With no
/// detections the buffer is returned untouched.
pub fn annotate(
    image: PixelBuffer,
    detections: &[Detection],
    color: [u8; 3],
    thickness: i32,
) -> Result<PixelBuffer> {
    if thickness <= 0 {
        return Err(PipelineError::InvalidAnnotationParameter(format!(
            "line thickness must be positive, got {}",
            thickness
        )));
    }
    image.ensure_color()?;

    if detections.is_empty() || image.pixel_count() == 0 {
        return Ok(image);
    }

    let [r, g, b] = color;
    let color = match image.order {
        ChannelOrder::Rgb => [r, g, b],
        ChannelOrder::Bgr => [b, g, r],
    };

    let PixelBuffer {
        width,
        height,
        channels,
        order,
        data,
    } = image;

    // A stroke as wide as the image already covers all of it
    let thickness = thickness.min(i32::try_from(width.saturating_add(height)).unwrap_or(i32::MAX));

    let data = if channels == 4 {
        let mut canvas: Image<Rgba<u8>> = to_canvas(width, height, data)?;
        draw_outlines(&mut canvas, detections, Rgba([color[0], color[1], color[2], 255]), thickness);
        canvas.into_raw()
    } else {
        let mut canvas: Image<Rgb<u8>> = to_canvas(width, height, data)?;
        draw_outlines(&mut canvas, detections, Rgb(color), thickness);
        canvas.into_raw()
    };

    debug!(
        "Drew {} outlines on {}x{} image (thickness {})",
        detections.len(),
        width,
        height,
        thickness
    );

    Ok(PixelBuffer {
        width,
        height,
        channels,
        order,
        data,
    })
}

/// Annotate using highlight options
pub fn annotate_with(
    image: PixelBuffer,
    detections: &[Detection],
    options: &HighlightOptions,
) -> Result<PixelBuffer> {
    annotate(image, detections, options.line_color, options.line_thickness)
}

fn to_canvas<P>(width: u32, height: u32, data: Vec<u8>) -> Result<Image<P>>
where
    P: Pixel<Subpixel = u8>,
{
    ImageBuffer::from_raw(width, height, data)
        .ok_or_else(|| PipelineError::InvalidDimension("buffer does not fit image".to_string()))
}

fn draw_outlines<C>(canvas: &mut C, detections: &[Detection], color: C::Pixel, thickness: i32)
where
    C: Canvas,
{
    for detection in detections {
        let corners = detection.polygon().map(to_pixel);
        for i in 0..corners.len() {
            let start = corners[i];
            let end = corners[(i + 1) % corners.len()];
            draw_thick_segment(canvas, start, end, color, thickness);
        }
    }
}

/// Truncate toward zero, matching integer polygon coordinates
fn to_pixel(p: Point) -> (i32, i32) {
    (
        p.x.clamp(-COORD_LIMIT, COORD_LIMIT) as i32,
        p.y.clamp(-COORD_LIMIT, COORD_LIMIT) as i32,
    )
}

/// Stroke a segment `thickness` pixels wide with round joins at both ends
fn draw_thick_segment<C>(canvas: &mut C, start: (i32, i32), end: (i32, i32), color: C::Pixel, thickness: i32)
where
    C: Canvas,
{
    let from = (start.0 as f32, start.1 as f32);
    let to = (end.0 as f32, end.1 as f32);

    if thickness == 1 {
        draw_line_segment_mut(canvas, from, to, color);
        return;
    }

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len > 0.0 {
        let half = thickness as f32 / 2.0;
        let (nx, ny) = (-dy / len * half, dx / len * half);
        let offset = |p: (f32, f32), sign: f32| {
            PixelPoint::new((p.0 + sign * nx).round() as i32, (p.1 + sign * ny).round() as i32)
        };
        let quad = [offset(from, 1.0), offset(to, 1.0), offset(to, -1.0), offset(from, -1.0)];
        // The rasterizer rejects polygons whose first and last points coincide
        if quad[0] != quad[3] {
            draw_polygon_mut(canvas, &quad, color);
        }
    }

    let radius = thickness / 2;
    draw_filled_circle_mut(canvas, start, radius, color);
    draw_filled_circle_mut(canvas, end, radius, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 3] = [0, 255, 0];

    fn square() -> Detection {
        Detection::new(
            [
                Point::new(2.0, 2.0),
                Point::new(17.0, 2.0),
                Point::new(17.0, 17.0),
                Point::new(2.0, 17.0),
            ],
            "box",
            0.9,
        )
        .unwrap()
    }

    fn pixel(buffer: &PixelBuffer, x: u32, y: u32) -> &[u8] {
        let ch = buffer.channels as usize;
        let idx = (y as usize * buffer.width as usize + x as usize) * ch;
        &buffer.data[idx..idx + ch]
    }

    #[test]
    fn test_no_detections_is_byte_identical() {
        let image = PixelBuffer::new((0..48).collect(), 4, 4, 3).unwrap();
        let annotated = annotate(image.clone(), &[], GREEN, 2).unwrap();
        assert_eq!(annotated, image);
    }

    #[test]
    fn test_non_positive_thickness_is_rejected() {
        let image = PixelBuffer::filled(4, 4, &[0, 0, 0]).unwrap();
        for thickness in [0, -1] {
            let result = annotate(image.clone(), &[square()], GREEN, thickness);
            assert!(matches!(result, Err(PipelineError::InvalidAnnotationParameter(_))));
        }
    }

    #[test]
    fn test_outline_thickness_one() {
        let image = PixelBuffer::filled(20, 20, &[0, 0, 0]).unwrap();
        let annotated = annotate(image, &[square()], GREEN, 1).unwrap();

        assert_eq!(pixel(&annotated, 2, 10), &GREEN);
        assert_eq!(pixel(&annotated, 17, 10), &GREEN);
        assert_eq!(pixel(&annotated, 10, 2), &GREEN);
        assert_eq!(pixel(&annotated, 10, 17), &GREEN);
        // Interior and exterior stay untouched
        assert_eq!(pixel(&annotated, 10, 10), &[0, 0, 0]);
        assert_eq!(pixel(&annotated, 0, 0), &[0, 0, 0]);
    }

    #[test]
    fn test_outline_thickness_three() {
        let image = PixelBuffer::filled(20, 20, &[0, 0, 0]).unwrap();
        let annotated = annotate(image, &[square()], GREEN, 3).unwrap();

        assert_eq!(pixel(&annotated, 1, 10), &GREEN);
        assert_eq!(pixel(&annotated, 2, 10), &GREEN);
        assert_eq!(pixel(&annotated, 3, 10), &GREEN);
        assert_eq!(pixel(&annotated, 10, 10), &[0, 0, 0]);
    }

    #[test]
    fn test_rgba_outline_is_opaque() {
        let image = PixelBuffer::filled(20, 20, &[0, 0, 0, 0]).unwrap();
        let annotated = annotate(image, &[square()], GREEN, 1).unwrap();

        assert_eq!(annotated.channels, 4);
        assert_eq!(pixel(&annotated, 2, 10), &[0, 255, 0, 255]);
        assert_eq!(pixel(&annotated, 10, 10), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_bgr_buffer_receives_swapped_color() {
        let image = PixelBuffer::filled(20, 20, &[0, 0, 0])
            .unwrap()
            .with_order(ChannelOrder::Bgr);
        let annotated = annotate(image, &[square()], [255, 0, 0], 1).unwrap();

        assert_eq!(annotated.order, ChannelOrder::Bgr);
        assert_eq!(pixel(&annotated, 2, 10), &[0, 0, 255]);
    }

    #[test]
    fn test_out_of_bounds_and_degenerate_polygons() {
        let image = PixelBuffer::filled(10, 10, &[0, 0, 0]).unwrap();
        let detections = vec![
            Detection::from_rect(-50.0, -50.0, 500.0, 500.0, "huge", 0.5).unwrap(),
            Detection::new([Point::new(4.0, 4.0); 4], "dot", 0.5).unwrap(),
            Detection::from_rect(1e12, 1e12, 1.0, 1.0, "far", 0.5).unwrap(),
        ];
        let annotated = annotate(image, &detections, GREEN, 2).unwrap();

        assert_eq!(annotated.data.len(), 10 * 10 * 3);
        assert_eq!(pixel(&annotated, 4, 4), &GREEN);
    }

    #[test]
    fn test_rejects_inconsistent_buffer() {
        let image = PixelBuffer {
            width: 4,
            height: 4,
            channels: 3,
            order: ChannelOrder::Rgb,
            data: vec![0; 10],
        };
        let result = annotate(image, &[square()], GREEN, 1);
        assert!(matches!(result, Err(PipelineError::InvalidDimension(_))));
    }

    #[test]
    fn test_annotate_with_default_options() {
        let image = PixelBuffer::filled(20, 20, &[0, 0, 0]).unwrap();
        let annotated = annotate_with(image, &[square()], &HighlightOptions::default()).unwrap();
        assert_eq!(pixel(&annotated, 2, 10), &GREEN);
    }

    #[test]
    fn test_huge_thickness_on_small_image() {
        let image = PixelBuffer::filled(10, 10, &[0, 0, 0]).unwrap();
        let detections = [Detection::from_rect(2.0, 2.0, 5.0, 5.0, "box", 0.9).unwrap()];

        let annotated = annotate(image, &detections, GREEN, 40_000).unwrap();

        assert_eq!(annotated.data.len(), 10 * 10 * 3);
        assert!(annotated.data.chunks_exact(3).all(|p| p == &GREEN[..]));
    }
}
