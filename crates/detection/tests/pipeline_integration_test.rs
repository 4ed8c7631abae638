use detection::{
    CornerBox, DetectionError, LetterboxOptions, Pipeline, PipelineConfig, letterbox,
    nms::suppress, run,
};
use image::RgbImage;
use ndarray::{Array, ArrayD, IxDyn};

const ITERATIONS: usize = 200;

/// Random `[1, n, 5 + num_classes]` prediction with boxes inside a 416x416 canvas.
fn random_prediction(rng: &mut fastrand::Rng, n: usize, num_classes: usize) -> ArrayD<f32> {
    let columns = 5 + num_classes;
    let mut data = Vec::with_capacity(n * columns);
    for _ in 0..n {
        data.push(rng.f32() * 416.0); // cx
        data.push(rng.f32() * 416.0); // cy
        data.push(rng.f32() * 80.0); // w
        data.push(rng.f32() * 80.0); // h
        data.push(rng.f32()); // objectness
        for _ in 0..num_classes {
            data.push(rng.f32());
        }
    }
    Array::from_shape_vec(IxDyn(&[1, n, columns]), data).unwrap()
}

fn random_boxes(rng: &mut fastrand::Rng, n: usize) -> Vec<CornerBox> {
    (0..n)
        .map(|_| {
            let x1 = rng.f32() * 200.0;
            let y1 = rng.f32() * 200.0;
            CornerBox {
                x1,
                y1,
                x2: x1 + rng.f32() * 60.0,
                y2: y1 + rng.f32() * 60.0,
                // Coarse confidences so that ties actually happen
                confidence: rng.u8(0..10) as f32 / 10.0,
                class_id: 0,
            }
        })
        .collect()
}

/// Test that no output box carries a confidence at or below the threshold
///
/// Tests:
/// - Random tensors with varying row and class counts
/// - Several thresholds including the default
#[test]
fn test_confidence_filter_over_random_tensors() {
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..ITERATIONS {
        let n = rng.usize(0..64);
        let num_classes = rng.usize(1..4);
        let threshold = [0.0, 0.3, 0.7, 0.95][rng.usize(0..4)];
        let raw = random_prediction(&mut rng, n, num_classes);

        let detections = run(raw.view(), threshold, 0.6).unwrap();

        assert!(detections.len() <= n);
        for b in &detections {
            assert!(
                b.confidence > threshold,
                "Box with confidence {} leaked through threshold {}",
                b.confidence,
                threshold
            );
            assert!(b.class_id < num_classes);
        }
    }
}

/// Test that suppressing an already-suppressed set changes nothing
#[test]
fn test_nms_idempotence() {
    let mut rng = fastrand::Rng::with_seed(11);

    for _ in 0..ITERATIONS {
        let n = rng.usize(0..40);
        let boxes = random_boxes(&mut rng, n);
        let threshold = rng.f32();

        let once = suppress(&boxes, threshold);
        let twice = suppress(&once, threshold);

        assert_eq!(
            once, twice,
            "NMS should be idempotent at threshold {threshold}"
        );
    }
}

/// Test that raising the IoU threshold never keeps fewer boxes
///
/// Uses rows of evenly spaced boxes with confidence falling along the row, the
/// layout of a detector firing repeatedly around one target. Greedy NMS is not
/// monotone for arbitrary layouts, so the boxes are not fully random here.
#[test]
fn test_nms_threshold_monotonicity() {
    let mut rng = fastrand::Rng::with_seed(13);
    let thresholds = [0.0, 0.1, 0.25, 0.4, 0.5, 0.6, 0.75, 0.9, 1.0];

    for _ in 0..ITERATIONS {
        let n = rng.usize(1..40);
        // Integer geometry keeps IoU exactly translation invariant
        let size = rng.u32(5..45) as f32;
        let step = rng.u32(0..size as u32) as f32;
        let boxes: Vec<CornerBox> = (0..n)
            .map(|i| CornerBox {
                x1: i as f32 * step,
                y1: 0.0,
                x2: i as f32 * step + size,
                y2: size,
                confidence: 1.0 - i as f32 / n as f32,
                class_id: 0,
            })
            .collect();

        let counts: Vec<usize> = thresholds
            .iter()
            .map(|&t| suppress(&boxes, t).len())
            .collect();

        assert!(
            counts.windows(2).all(|w| w[0] <= w[1]),
            "Kept counts should be non-decreasing in threshold: {:?}",
            counts
        );
        assert_eq!(counts[counts.len() - 1], boxes.len(), "IoU never exceeds 1");
    }
}

/// Test that surviving boxes of the same class never overlap past the threshold
#[test]
fn test_no_same_class_overlap_in_output() {
    let mut rng = fastrand::Rng::with_seed(17);
    let iou_threshold = 0.6;

    for _ in 0..ITERATIONS {
        let n = rng.usize(0..80);
        let raw = random_prediction(&mut rng, n, 2);
        let detections = run(raw.view(), 0.5, iou_threshold).unwrap();
        let boxes = detections.as_slice();

        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                if a.class_id == b.class_id {
                    assert!(a.iou(b) <= iou_threshold);
                }
            }
        }

        assert!(
            boxes.windows(2).all(|w| w[0].class_id <= w[1].class_id),
            "Classes should be emitted in ascending order"
        );
    }
}

/// Test that identical geometry in different classes is never suppressed
#[test]
fn test_class_isolation() {
    let raw = Array::from_shape_vec(
        IxDyn(&[1, 3, 8]),
        vec![
            100.0, 100.0, 30.0, 30.0, 0.9, 1.0, 0.0, 0.0, //
            100.0, 100.0, 30.0, 30.0, 0.8, 0.0, 1.0, 0.0, //
            100.0, 100.0, 30.0, 30.0, 0.75, 0.0, 0.0, 1.0,
        ],
    )
    .unwrap();

    let detections = Pipeline::default().run(raw.view()).unwrap();

    let classes: Vec<usize> = detections.iter().map(|b| b.class_id).collect();
    assert_eq!(classes, vec![0, 1, 2]);
}

/// Test the three-row scenario: A kept, B suppressed by A, C kept in its own class
#[test]
fn test_end_to_end_scenario() {
    let raw = Array::from_shape_vec(
        IxDyn(&[1, 3, 7]),
        vec![
            50.0, 50.0, 20.0, 20.0, 0.9, 0.9, 0.1, // A
            52.0, 52.0, 20.0, 20.0, 0.85, 0.8, 0.2, // B
            300.0, 300.0, 10.0, 10.0, 0.95, 0.1, 0.9, // C
        ],
    )
    .unwrap();

    let detections = run(raw.view(), 0.7, 0.6).unwrap();

    let coords: Vec<(f32, f32, f32, f32, usize)> = detections
        .iter()
        .map(|b| (b.x1, b.y1, b.x2, b.y2, b.class_id))
        .collect();
    assert_eq!(
        coords,
        vec![(40.0, 40.0, 60.0, 60.0, 0), (295.0, 295.0, 305.0, 305.0, 1)]
    );
}

/// Test that a squeezed `(N, 5+C)` tensor behaves like its batched form
#[test]
fn test_squeezed_tensor_matches_batched() {
    let mut rng = fastrand::Rng::with_seed(19);
    let batched = random_prediction(&mut rng, 50, 3);
    let squeezed = batched.clone().into_shape_with_order(IxDyn(&[50, 8])).unwrap();

    assert_eq!(
        run(batched.view(), 0.5, 0.6).unwrap(),
        run(squeezed.view(), 0.5, 0.6).unwrap()
    );
}

/// Test that objectness at or below 0.7 yields an empty set rather than an error
#[test]
fn test_all_below_threshold_is_empty() {
    let mut rng = fastrand::Rng::with_seed(23);
    let mut raw = random_prediction(&mut rng, 30, 2);
    for row in raw.as_slice_mut().unwrap().chunks_mut(7) {
        row[4] *= 0.7;
    }

    let detections = Pipeline::new(PipelineConfig::default())
        .run(raw.view())
        .unwrap();
    assert!(detections.is_empty());
}

/// Test that a tensor without class scores is rejected
#[test]
fn test_invalid_shape() {
    let raw = Array::from_shape_vec(IxDyn(&[1, 3, 5]), vec![0.9; 15]).unwrap();

    let err = run(raw.view(), 0.7, 0.6).unwrap_err();
    assert!(matches!(err, DetectionError::InvalidInputShape { .. }));
}

/// Test letterbox output size and scale bound over random image sizes
#[test]
fn test_letterbox_output_is_always_target_size() {
    let mut rng = fastrand::Rng::with_seed(29);

    for _ in 0..50 {
        let width = rng.u32(1..900);
        let height = rng.u32(1..900);
        let target = [32, 416, 640][rng.usize(0..3)];
        let image = RgbImage::new(width, height);

        let out = letterbox(&image, &LetterboxOptions::square(target)).unwrap();

        assert_eq!(out.image.dimensions(), (target, target));
        let longest = width.max(height) as f32;
        assert!(out.transform.scale * longest <= target as f32 + 1e-3);
    }
}
