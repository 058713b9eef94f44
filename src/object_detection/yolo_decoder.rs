use crate::error::DecodeError;
use ndarray::{ArrayView2, ArrayView3, Axis, s};
use serde::{Deserialize, Serialize};

/// How candidate rows are arranged inside a `[1, a, b]` output tensor.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// Pick [`OutputLayout::AttributesFirst`] when `a < b`, otherwise rows first. Only reliable
    /// when the model emits more rows than attributes, which holds for real YOLO heads.
    Auto,
    /// `[1, stride, rows]`, the usual YOLOv8/YOLO11 export.
    #[default]
    AttributesFirst,
    /// `[1, rows, stride]`.
    RowsFirst,
}

/// One decoded row, still in model input coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDetection {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

fn candidate_rows(
    output: ArrayView3<'_, f32>,
    layout: OutputLayout,
) -> Result<ArrayView2<'_, f32>, DecodeError> {
    let batch = output.len_of(Axis(0));
    if batch != 1 {
        return Err(DecodeError::BatchSize(batch));
    }
    let plane = output.index_axis_move(Axis(0), 0);
    let attributes_first = match layout {
        OutputLayout::Auto => plane.nrows() < plane.ncols(),
        OutputLayout::AttributesFirst => true,
        OutputLayout::RowsFirst => false,
    };
    Ok(if attributes_first { plane.reversed_axes() } else { plane })
}

/// Turns a raw detector output into candidates whose confidence is above `score_threshold`.
///
/// Every row reads `(cx, cy, w, h, score_0, .., score_k)` and the best class score becomes the
/// confidence. The number of rows and their stride come from the tensor itself.
pub fn decode_detections(
    output: ArrayView3<f32>,
    layout: OutputLayout,
    score_threshold: f32,
) -> Result<Vec<RawDetection>, DecodeError> {
    let rows = candidate_rows(output, layout)?;
    let stride = rows.ncols();
    if stride < 5 {
        return Err(DecodeError::StrideTooSmall(stride));
    }
    let detections = rows
        .axis_iter(Axis(0))
        .filter_map(|row| {
            let confidence = row
                .slice(s![4..])
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            // Strict comparison, a score equal to the threshold is rejected.
            if confidence.is_nan() || confidence <= score_threshold {
                return None;
            }
            Some(RawDetection {
                center_x: row[0],
                center_y: row[1],
                width: row[2],
                height: row[3],
                confidence,
            })
        })
        .collect();
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Builds a `[1, 5, rows]` tensor from row tuples.
    fn attributes_first(rows: &[[f32; 5]]) -> Array3<f32> {
        let mut arr = Array3::zeros((1, 5, rows.len()));
        for (r, row) in rows.iter().enumerate() {
            for (a, value) in row.iter().enumerate() {
                arr[[0, a, r]] = *value;
            }
        }
        arr
    }

    #[test]
    fn keeps_rows_above_threshold() {
        let output = attributes_first(&[
            [320.0, 320.0, 40.0, 20.0, 0.9],
            [100.0, 100.0, 10.0, 10.0, 0.1],
            [50.0, 60.0, 8.0, 6.0, 0.3],
        ]);
        let dets = decode_detections(output.view(), OutputLayout::AttributesFirst, 0.15).unwrap();
        assert_eq!(
            dets,
            vec![
                RawDetection {
                    center_x: 320.0,
                    center_y: 320.0,
                    width: 40.0,
                    height: 20.0,
                    confidence: 0.9
                },
                RawDetection {
                    center_x: 50.0,
                    center_y: 60.0,
                    width: 8.0,
                    height: 6.0,
                    confidence: 0.3
                },
            ]
        );
    }

    #[test]
    fn threshold_is_strict() {
        let at = 0.15_f32;
        let above = f32::from_bits(at.to_bits() + 1);
        let output = attributes_first(&[[1.0, 1.0, 1.0, 1.0, at], [2.0, 2.0, 1.0, 1.0, above]]);
        let dets = decode_detections(output.view(), OutputLayout::AttributesFirst, at).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].confidence, above);
    }

    #[test]
    fn row_count_comes_from_tensor() {
        let rows: Vec<[f32; 5]> = (0..8400).map(|i| [i as f32, 0.0, 1.0, 1.0, 0.5]).collect();
        let output = attributes_first(&rows);
        let dets = decode_detections(output.view(), OutputLayout::Auto, 0.15).unwrap();
        assert_eq!(dets.len(), 8400);
        assert_eq!(dets[8399].center_x, 8399.0);
    }

    #[test]
    fn rows_first_layout() {
        let output = Array3::from_shape_vec(
            (1, 2, 6),
            vec![
                10.0, 20.0, 4.0, 4.0, 0.2, 0.7, //
                30.0, 40.0, 4.0, 4.0, 0.1, 0.05,
            ],
        )
        .unwrap();
        let dets = decode_detections(output.view(), OutputLayout::RowsFirst, 0.15).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].center_x, 10.0);
        assert_eq!(dets[0].confidence, 0.7);
    }

    #[test]
    fn auto_layout_prefers_short_attribute_axis() {
        // Two rows of stride six laid out as [1, 6, 2].
        let mut output = Array3::zeros((1, 6, 2));
        output[[0, 0, 1]] = 12.0;
        output[[0, 5, 1]] = 0.8;
        // With a = 6 > b = 2 auto assumes rows first and sees a stride of 2.
        assert_eq!(
            decode_detections(output.view(), OutputLayout::Auto, 0.15),
            Err(DecodeError::StrideTooSmall(2))
        );
        let dets = decode_detections(output.view(), OutputLayout::AttributesFirst, 0.15).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].center_x, 12.0);
    }

    #[test]
    fn rejects_bad_shapes() {
        let batched = Array3::<f32>::zeros((2, 5, 10));
        assert_eq!(
            decode_detections(batched.view(), OutputLayout::Auto, 0.15),
            Err(DecodeError::BatchSize(2))
        );
        let narrow = Array3::<f32>::zeros((1, 4, 10));
        assert_eq!(
            decode_detections(narrow.view(), OutputLayout::Auto, 0.15),
            Err(DecodeError::StrideTooSmall(4))
        );
    }

    #[test]
    fn empty_output_is_fine() {
        let output = Array3::<f32>::zeros((1, 5, 0));
        let dets = decode_detections(output.view(), OutputLayout::AttributesFirst, 0.15).unwrap();
        assert!(dets.is_empty());
    }
}
