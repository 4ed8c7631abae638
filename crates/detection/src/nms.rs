use crate::geometry::CornerBox;

/// Greedy non-maximum suppression over boxes of a single class.
///
/// Boxes are visited in descending confidence (stable, so ties keep input order).
/// Each visited box is kept and every remaining box whose IoU with it is strictly
/// greater than `iou_threshold` is dropped. The result is in keep order.
///
/// Class is not inspected here; callers partition by class first.
pub fn suppress(boxes: &[CornerBox], iou_threshold: f32) -> Vec<CornerBox> {
    let mut remaining: Vec<usize> = (0..boxes.len()).collect();
    remaining.sort_by(|&a, &b| boxes[b].confidence.total_cmp(&boxes[a].confidence));

    let mut kept = Vec::new();
    while let Some((&best, rest)) = remaining.split_first() {
        let best_box = boxes[best];
        kept.push(best_box);

        remaining = rest
            .iter()
            .copied()
            .filter(|&i| best_box.iou(&boxes[i]) <= iou_threshold)
            .collect();
    }

    kept
}
