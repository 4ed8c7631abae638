use crate::{
    error::{DetectionError, Result},
    geometry::CenterBox,
};
use ndarray::{ArrayView1, ArrayView2, ArrayViewD, Axis, Ix2, s};

/// Leading columns of every prediction row: `cx, cy, w, h, objectness`.
pub const BOX_FIELDS: usize = 5;
const OBJECTNESS: usize = 4;

/// Decode raw detector rows `[cx, cy, w, h, objectness, class_scores...]` into
/// center-form candidates.
///
/// Accepts `(N, 5 + C)` or `(1, N, 5 + C)`. A row is kept only when its objectness
/// is strictly greater than `confidence_threshold`; the class is the argmax of the
/// raw class scores and does not affect the confidence.
///
/// When `num_classes` is given the trailing dimension must be exactly
/// `5 + num_classes`, otherwise any `C >= 1` is accepted.
pub fn decode(
    raw: ArrayViewD<'_, f32>,
    confidence_threshold: f32,
    num_classes: Option<usize>,
) -> Result<Vec<CenterBox>> {
    let rows = prediction_rows(raw, num_classes)?;

    let mut candidates = Vec::new();
    for row in rows.rows() {
        let confidence = row[OBJECTNESS];
        // Also rejects NaN
        if !(confidence > confidence_threshold) {
            continue;
        }

        candidates.push(CenterBox {
            cx: row[0],
            cy: row[1],
            w: row[2],
            h: row[3],
            confidence,
            class_id: argmax(row.slice(s![BOX_FIELDS..])),
        });
    }

    tracing::trace!(
        rows = rows.nrows(),
        candidates = candidates.len(),
        confidence_threshold,
        "Decoded prediction rows"
    );

    Ok(candidates)
}

fn prediction_rows<'a>(
    raw: ArrayViewD<'a, f32>,
    num_classes: Option<usize>,
) -> Result<ArrayView2<'a, f32>> {
    let shape = raw.shape().to_vec();

    let rows = match shape.len() {
        2 => raw,
        3 if shape[0] == 1 => raw.index_axis_move(Axis(0), 0),
        3 => {
            return Err(DetectionError::invalid_shape(
                &shape,
                format!("batch size {} is not supported, expected 1", shape[0]),
            ));
        }
        rank => {
            return Err(DetectionError::invalid_shape(
                &shape,
                format!(
                    "rank {} is not supported, expected (N, 5+C) or (1, N, 5+C)",
                    rank
                ),
            ));
        }
    };

    let columns = shape[shape.len() - 1];
    if let Some(num_classes) = num_classes {
        if columns != BOX_FIELDS + num_classes {
            return Err(DetectionError::invalid_shape(
                &shape,
                format!(
                    "expected {} columns for {} classes, got {}",
                    BOX_FIELDS + num_classes,
                    num_classes,
                    columns
                ),
            ));
        }
    }
    if columns <= BOX_FIELDS {
        return Err(DetectionError::invalid_shape(
            &shape,
            format!(
                "expected at least {} columns (5 box fields + 1 class score), got {}",
                BOX_FIELDS + 1,
                columns
            ),
        ));
    }

    rows.into_dimensionality::<Ix2>()
        .map_err(|e| DetectionError::invalid_shape(&shape, e.to_string()))
}

/// Index of the first maximum.
fn argmax(scores: ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    let mut best_score = f32::NEG_INFINITY;
    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}
