//! Exhaustive checks over the status transition table.

use vfx_core::{Gamma, Palette};
use vfx_layer::{Layer, LayerError, LayerStatus};

fn fresh_video() -> Layer {
    let layer = Layer::new_for_frame(0, 0);
    layer.set_palette(Palette::Rgb24).set_size(4, 4);
    layer
}

/// Walks every legal path from `Prepared`, checking that buffers exist
/// exactly in data-bearing states and that status only moves forward.
fn walk(path: &mut Vec<LayerStatus>, paths: &mut usize) {
    let layer = fresh_video();
    for &s in &path[1..] {
        layer.try_set_status(s).expect("legal transition rejected");
    }
    let here = layer.status();
    assert_eq!(Some(&here), path.last());
    assert_eq!(
        layer.has_pixel_data(),
        here.is_data_bearing(),
        "buffer presence wrong after {path:?}"
    );
    *paths += 1;

    for &next in here.successors().iter().chain([LayerStatus::Invalid].iter()) {
        if here == LayerStatus::Invalid {
            break;
        }
        assert!(next.as_u8() > here.as_u8());
        path.push(next);
        walk(path, paths);
        path.pop();
    }
}

#[test]
fn test_every_legal_path() {
    let mut paths = 0;
    walk(&mut vec![LayerStatus::Prepared], &mut paths);
    // Prepared..Ready via Converting or not, each prefix optionally ending
    // in Invalid.
    assert!(paths > 10, "only {paths} paths walked");
}

#[test]
fn test_illegal_transitions_rejected() {
    for from in LayerStatus::ALL {
        for to in LayerStatus::ALL {
            if from.can_advance_to(to) || from == to {
                continue;
            }
            let layer = fresh_video();
            // Drive the layer to `from` along the shortest path.
            let route: &[LayerStatus] = match from {
                LayerStatus::None | LayerStatus::Tref => continue,
                LayerStatus::Prepared => &[],
                LayerStatus::Queued => &[LayerStatus::Queued],
                LayerStatus::Loading => &[LayerStatus::Queued, LayerStatus::Loading],
                LayerStatus::Loaded => &[
                    LayerStatus::Queued,
                    LayerStatus::Loading,
                    LayerStatus::Loaded,
                ],
                LayerStatus::Converting => &[
                    LayerStatus::Queued,
                    LayerStatus::Loading,
                    LayerStatus::Loaded,
                    LayerStatus::Converting,
                ],
                LayerStatus::Ready => &[
                    LayerStatus::Queued,
                    LayerStatus::Loading,
                    LayerStatus::Loaded,
                    LayerStatus::Ready,
                ],
                LayerStatus::Invalid => &[LayerStatus::Invalid],
            };
            for &s in route {
                layer.set_status(s);
            }
            assert_eq!(layer.status(), from);
            let had_data = layer.has_pixel_data();

            match layer.try_set_status(to) {
                Err(LayerError::IllegalTransition { from: f, to: t }) => {
                    assert_eq!((f, t), (from, to));
                }
                other => panic!("{from} -> {to} accepted: {other:?}"),
            }
            assert_eq!(layer.status(), from);
            assert_eq!(layer.has_pixel_data(), had_data);
        }
    }
}

#[test]
fn test_tref_anywhere_keeps_status() {
    let layer = Layer::create_blank(2, 2, Palette::Rgb24, Gamma::Srgb).unwrap();
    layer.enable_timing();
    for _ in 0..3 {
        assert_eq!(layer.try_set_status(LayerStatus::Tref).unwrap(), LayerStatus::Loaded);
    }
    assert_eq!(layer.status(), LayerStatus::Loaded);
    let timing = layer.timing().unwrap();
    assert_eq!(
        timing
            .entries()
            .iter()
            .filter(|e| e.status == LayerStatus::Tref)
            .count(),
        3
    );
}

#[test]
fn test_none_must_be_prepared_first() {
    let layer = Layer::new(vfx_layer::LayerKind::Video);
    assert!(layer.try_set_status(LayerStatus::Queued).is_err());
    layer.set_status(LayerStatus::Prepared).set_status(LayerStatus::Queued);
    assert_eq!(layer.status(), LayerStatus::Queued);
}

#[test]
fn test_backwards_move_needs_new_layer() {
    let layer = Layer::create_blank(2, 2, Palette::Rgb24, Gamma::Srgb).unwrap();
    layer.set_status(LayerStatus::Ready);
    assert!(layer.try_set_status(LayerStatus::Loading).is_err());
    assert!(layer.has_pixel_data());
}
