use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;

/// Non maxmimum suppression is a way of removing duplicate detections.
///
/// Detections at or below `score_threshold` are dropped first. The rest are visited from most to
/// least confident, and each kept detection removes every later one whose IoU with it is at least
/// `iou_threshold`. Equal confidences keep their input order, so identical inputs always give
/// identical output. The survivors come back in the order they were kept.
pub fn non_maximum_suppression<T: BoundingBoxGeometry>(
    mut detections: Vec<Detection<T>>,
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<Detection<T>> {
    detections.retain(|det| det.confidence > score_threshold);
    // sort_by is stable.
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        if detections_to_remove[current_index] {
            continue;
        }
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            if detections_to_remove[current_index + other_index + 1] {
                continue;
            }
            let iou = current_det
                .annotation
                .intersection_over_union(&other_det.annotation);
            if iou >= iou_threshold {
                detections_to_remove[current_index + other_index + 1] = true;
            }
        }
    }
    let mut drop_iter = detections_to_remove.into_iter();
    detections.retain(|_| !drop_iter.next().unwrap_or(true));
    detections
}
