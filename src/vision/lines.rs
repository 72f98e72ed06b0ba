//! Reading-order line reconstruction
//!
//! Detections are grouped into lines by vertical proximity, then each line is
//! ordered left to right. Grouping is a single forward pass over the items
//! sorted by `center_y`: the first item of a line is its anchor, and a later
//! item joins the line only while it stays within `y_threshold` of that anchor.
//! The anchor never moves, so text whose baseline drifts steadily up or down
//! across a line is split once the drift exceeds the threshold, even when
//! neighbouring items are close to each other.

use tracing::debug;

use super::detection::Detection;
use super::geometry::{extract, TextPosition};

/// Default line threshold, as a fraction of the average detection height
pub const DEFAULT_LINE_THRESHOLD_FACTOR: f64 = 0.5;

/// Rebuild the detected text as lines in reading order
///
/// Returns an empty string when there are no detections.
pub fn reconstruct(detections: &[Detection], line_threshold_factor: f64) -> String {
    if detections.is_empty() {
        return String::new();
    }

    let positions = extract(detections);
    let y_threshold = average_height(&positions) * line_threshold_factor;
    let lines = group_into_lines(positions, y_threshold);

    debug!(
        "Grouped {} detections into {} lines (y_threshold {:.2})",
        detections.len(),
        lines.len(),
        y_threshold
    );

    join_lines(lines)
}

/// Mean height over all positions
pub fn average_height(positions: &[TextPosition]) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }
    positions.iter().map(|p| p.height).sum::<f64>() / positions.len() as f64
}

/// Cluster positions into lines using the anchor-based pass
///
/// Items are stable-sorted by `center_y` first, so ties keep detection order.
pub fn group_into_lines(mut positions: Vec<TextPosition>, y_threshold: f64) -> Vec<Vec<TextPosition>> {
    positions.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));

    positions
        .into_iter()
        .fold(Vec::new(), |mut lines: Vec<Vec<TextPosition>>, item| {
            match lines.last_mut() {
                Some(line) if (item.center_y - line[0].center_y).abs() <= y_threshold => {
                    line.push(item)
                }
                _ => lines.push(vec![item]),
            }
            lines
        })
}

/// Order each line left to right and join everything into one string
pub fn join_lines(lines: Vec<Vec<TextPosition>>) -> String {
    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.left_x.total_cmp(&b.left_x));
            line.iter().map(|item| item.text.as_str()).collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::detection::Point;

    /// Detection of the given height whose center sits at `center_y`
    fn word(text: &str, left_x: f64, center_y: f64, height: f64) -> Detection {
        Detection::from_rect(left_x, center_y - height / 2.0, 30.0, height, text, 0.9).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reconstruct(&[], DEFAULT_LINE_THRESHOLD_FACTOR), "");
    }

    #[test]
    fn test_single_detection() {
        let detections = vec![word("Hello", 0.0, 50.0, 20.0)];
        assert_eq!(reconstruct(&detections, DEFAULT_LINE_THRESHOLD_FACTOR), "Hello");
    }

    #[test]
    fn test_same_line_sorted_by_left_x() {
        let detections = vec![
            word("World", 50.0, 100.0, 20.0),
            word("Hello", 10.0, 100.0, 20.0),
        ];
        assert_eq!(reconstruct(&detections, DEFAULT_LINE_THRESHOLD_FACTOR), "Hello World");
    }

    #[test]
    fn test_difference_equal_to_threshold_merges() {
        // avg height 20, factor 0.5 -> y_threshold 10
        let detections = vec![
            word("right", 60.0, 110.0, 20.0),
            word("left", 0.0, 100.0, 20.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "left right");
    }

    #[test]
    fn test_fractional_coordinates_at_threshold_merge() {
        let quad = |x: f64, top: f64, bottom: f64| {
            [
                Point::new(x, top),
                Point::new(x + 30.0, top),
                Point::new(x + 30.0, bottom),
                Point::new(x, bottom),
            ]
        };
        // Center difference and threshold are both 0.45 up to rounding
        let detections = vec![
            Detection::new(quad(0.0, 9.4, 10.3), "left", 0.9).unwrap(),
            Detection::new(quad(40.0, 9.85, 10.75), "right", 0.9).unwrap(),
        ];
        assert_eq!(reconstruct(&detections, DEFAULT_LINE_THRESHOLD_FACTOR), "left right");
    }

    #[test]
    fn test_difference_above_threshold_splits() {
        let detections = vec![
            word("second", 0.0, 110.5, 20.0),
            word("first", 60.0, 100.0, 20.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "first\nsecond");
    }

    #[test]
    fn test_anchor_does_not_follow_drift() {
        // Consecutive items are 8 apart but the third is 16 from the anchor
        let detections = vec![
            word("a", 0.0, 100.0, 20.0),
            word("b", 40.0, 108.0, 20.0),
            word("c", 80.0, 116.0, 20.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "a b\nc");
    }

    #[test]
    fn test_multiple_lines_in_vertical_order() {
        let detections = vec![
            word("line3", 0.0, 300.0, 20.0),
            word("two", 80.0, 200.0, 20.0),
            word("line1", 0.0, 100.0, 20.0),
            word("line2", 0.0, 202.0, 20.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "line1\nline2 two\nline3");
    }

    #[test]
    fn test_ties_keep_detection_order() {
        // Same center_y and same left_x: stable sorts keep input order
        let detections = vec![
            word("first", 10.0, 100.0, 20.0),
            word("second", 10.0, 100.0, 20.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "first second");
    }

    #[test]
    fn test_threshold_uses_global_average_height() {
        // Heights 40 and 0 -> avg 20 -> threshold 10
        let detections = vec![
            word("tall", 0.0, 100.0, 40.0),
            word("flat", 50.0, 109.0, 0.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "tall flat");
    }

    #[test]
    fn test_all_degenerate_polygons_split_unless_identical() {
        // avg height 0 -> threshold 0: only exact matches share a line
        let detections = vec![
            word("a", 10.0, 5.0, 0.0),
            word("b", 0.0, 5.0, 0.0),
            word("c", 0.0, 6.0, 0.0),
        ];
        assert_eq!(reconstruct(&detections, 0.5), "b a\nc");
    }

    #[test]
    fn test_group_count_and_token_order() {
        let detections = vec![
            word("d", 90.0, 300.0, 20.0),
            word("b", 50.0, 98.0, 20.0),
            word("a", 5.0, 101.0, 20.0),
            word("c", 20.0, 305.0, 20.0),
            word("e", 0.0, 500.0, 20.0),
        ];
        let positions = extract(&detections);
        let lines = group_into_lines(positions, 10.0);
        assert_eq!(lines.len(), 3);

        let text = reconstruct(&detections, 0.5);
        assert_eq!(text.split('\n').count(), lines.len());
        assert_eq!(text, "a b\nc d\ne");
    }

    #[test]
    fn test_average_height() {
        let positions = extract(&[
            word("a", 0.0, 10.0, 10.0),
            word("b", 0.0, 10.0, 30.0),
        ]);
        assert_eq!(average_height(&positions), 20.0);
        assert_eq!(average_height(&[]), 0.0);
    }
}
