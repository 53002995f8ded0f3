//! Batch merge scenarios with the default thresholds.

use vehicle_annot_rust::merge::{merge_boxes, MergeConfig};
use vehicle_annot_rust::model::BoundingBox;
use vehicle_annot_rust::Rect;

#[test]
fn test_near_duplicates_merge_into_envelope() {
    // IoU ≈ 0.68, well above the default 0.12
    let boxes = vec![
        BoundingBox::new("motorcycle", Rect::new(0, 0, 100, 100)),
        BoundingBox::new("motorcycle", Rect::new(10, 10, 110, 110)),
    ];
    let (merged, count) = merge_boxes(&boxes, &MergeConfig::default());
    assert_eq!(count, 1);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].coords, Rect::new(0, 0, 110, 110));
}

#[test]
fn test_far_apart_boxes_stay_separate() {
    let boxes = vec![
        BoundingBox::new("motorcycle", Rect::new(0, 0, 10, 10)),
        BoundingBox::new("motorcycle", Rect::new(1000, 1000, 1010, 1010)),
    ];
    let (merged, count) = merge_boxes(&boxes, &MergeConfig::default());
    assert_eq!(count, 0);
    assert_eq!(merged.len(), 2);
}

#[test]
fn test_non_mergeable_classes_pass_through() {
    // two identical car boxes: cars are not in the default mergeable set
    let boxes = vec![
        BoundingBox::new("car", Rect::new(0, 0, 100, 100)),
        BoundingBox::new("car", Rect::new(0, 0, 100, 100)),
    ];
    let (merged, count) = merge_boxes(&boxes, &MergeConfig::default());
    assert_eq!(count, 0);
    assert_eq!(merged, boxes);
}

#[test]
fn test_rider_split_scenario() {
    // a detector split one motorcycle into wheel + body fragments next to a
    // passing car
    let boxes = vec![
        BoundingBox::new("car", Rect::new(400, 100, 700, 300)),
        BoundingBox::new("motorcycle", Rect::new(100, 150, 180, 260)),
        BoundingBox::new("motorcycle", Rect::new(120, 140, 210, 270)),
    ];
    let (merged, count) = merge_boxes(&boxes, &MergeConfig::default());
    assert_eq!(count, 1);
    assert_eq!(merged.len(), 2);

    let moto = merged.iter().find(|b| b.class == "motorcycle").unwrap();
    assert_eq!(moto.coords, Rect::new(100, 140, 210, 270));
    let car = merged.iter().find(|b| b.class == "car").unwrap();
    assert_eq!(car.coords, Rect::new(400, 100, 700, 300));
}
