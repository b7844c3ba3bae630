//! End-to-end layer lifecycle: blank frames, copies, transfers, teardown.

use std::sync::Arc;

use vfx_core::{Gamma, Palette};
use vfx_layer::{
    ClipSourceGroup, Layer, LayerError, LayerKind, LayerStatus, SourceGroupRef, TransferError,
};

struct Clip {
    name: String,
}

impl ClipSourceGroup for Clip {
    fn label(&self) -> &str {
        &self.name
    }
}

#[test]
fn test_blank_frame_lifecycle() {
    let layer = Layer::create_blank(720, 480, Palette::Rgb24, Gamma::Srgb)
        .expect("Failed to create blank layer");

    assert_eq!(layer.rowstride(), 2160);
    assert_eq!(layer.width(), 720);
    assert_eq!(layer.height(), 480);
    assert_eq!(layer.size_in_bytes(), 2160 * 480);
    assert_eq!(layer.status(), LayerStatus::Loaded);
    assert_eq!(layer.ref_count(), 1);
    {
        let px = layer.pixel_data().expect("blank layer has pixels");
        assert_eq!(px.len_bytes(), 2160 * 480);
        assert!(px.plane(0).unwrap().iter().all(|&b| b == 0));
    }

    layer.set_status(LayerStatus::Ready);
    assert_eq!(layer.ref_dec(), 0);
    assert!(layer.is_destroyed());
    assert!(!layer.has_pixel_data());
    assert_eq!(layer.status(), LayerStatus::Invalid);
}

#[test]
fn test_refcount_symmetry() {
    let layer = Layer::new_for_frame(3, 42);
    let ops = [true, true, false, true, false, false, true, true, true, false];
    let (mut incs, mut decs) = (0, 0);
    for inc in ops {
        if inc {
            layer.ref_inc();
            incs += 1;
        } else {
            layer.ref_dec();
            decs += 1;
        }
        assert_eq!(layer.ref_count(), 1 + incs - decs);
    }
    while layer.ref_count() > 0 {
        layer.ref_dec();
    }
    assert!(layer.is_destroyed());
    assert!(layer.acquire().is_none());
}

#[test]
fn test_precise_blank_validation() {
    let layer = Layer::create_blank_precise(16, 8, &[32, 16, 16], Gamma::Bt709, Palette::Yuv420P)
        .expect("Failed to create precise layer");
    assert_eq!(layer.rowstrides(), vec![32, 16, 16]);
    assert_eq!(layer.size_in_bytes(), 32 * 8 + 16 * 4 * 2);

    let err = Layer::create_blank_precise(16, 8, &[16, 8], Gamma::Bt709, Palette::Yuv420P)
        .unwrap_err();
    assert!(matches!(
        err,
        LayerError::PlaneCountMismatch {
            expected: 3,
            got: 2,
            ..
        }
    ));

    let err = Layer::create_blank_precise(16, 8, &[8], Gamma::Srgb, Palette::Rgb24).unwrap_err();
    assert!(matches!(
        err,
        LayerError::InvalidStride {
            plane: 0,
            stride: 8,
            min_stride: 48
        }
    ));
}

#[test]
fn test_packed_422_width_is_macropixels() {
    let layer = Layer::create_blank(720, 2, Palette::Uyvy, Gamma::Bt709).unwrap();
    assert_eq!(layer.width(), 360);
    assert_eq!(layer.width_pixels(), 720);
    assert_eq!(layer.rowstride(), 1440);
}

#[test]
fn test_copy_is_independent() {
    let clip = Arc::new(Clip {
        name: "shot_010".into(),
    });
    let src = Layer::create_blank(4, 4, Palette::Rgba32, Gamma::Linear).unwrap();
    src.set_clip_id(7).set_frame(101).set_track(2);
    src.set_source_group(SourceGroupRef::new(&clip));

    let copy = Layer::copy(None, &src).expect("Failed to copy layer");
    assert_eq!(copy.clip_id(), Some(7));
    assert_eq!(copy.frame(), 101);
    assert_eq!(copy.track(), 2);
    assert_eq!(copy.pixel_descriptor(), src.pixel_descriptor());
    let group = copy.source_group().expect("copy keeps source group");
    assert_eq!(group.upgrade().unwrap().label(), "shot_010");

    copy.pixel_data_mut().unwrap().plane_mut(0).unwrap().fill(9);
    assert!(src.pixel_data().unwrap().plane(0).unwrap().iter().all(|&b| b == 0));

    // Destroying one side leaves the other untouched.
    src.ref_dec();
    assert!(src.is_destroyed());
    assert!(copy.has_pixel_data());
    assert_eq!(copy.ref_count(), 1);
}

#[test]
fn test_transfer_semantics() {
    let src = Layer::create_blank(8, 2, Palette::Yuv422P, Gamma::Bt709).unwrap();
    let dst = Layer::new(LayerKind::Video);

    Layer::transfer_pixel_data(&dst, &src).expect("Failed to transfer");
    assert!(!src.has_pixel_data());
    assert!(src.is_valid());
    assert_eq!(dst.palette(), Palette::Yuv422P);
    assert_eq!(dst.rowstrides(), vec![8, 4, 4]);
    assert_eq!(dst.status(), LayerStatus::Loaded);

    // A second transfer from the same source has nothing to move.
    assert_eq!(
        Layer::transfer_pixel_data(&dst, &src),
        Err(TransferError::NoData)
    );
    assert!(dst.has_pixel_data());

    let audio = Layer::new_audio(48_000, 2, 16);
    assert_eq!(
        Layer::transfer_pixel_data(&audio, &dst),
        Err(TransferError::KindMismatch {
            src: LayerKind::Video,
            dst: LayerKind::Audio,
        })
    );
    assert!(dst.has_pixel_data());
}

#[test]
fn test_audio_transfer() {
    let src = Layer::new_audio(44_100, 1, 8);
    src.set_status(LayerStatus::Queued).set_status(LayerStatus::Loading);
    src.audio_data_mut().unwrap()[0].fill(0.5);

    let dst = Layer::new(LayerKind::Audio);
    Layer::transfer_pixel_data(&dst, &src).unwrap();
    assert_eq!(dst.audio_rate(), 44_100);
    assert_eq!(dst.audio_data().unwrap()[0], vec![0.5; 8]);
    assert!(!src.has_audio_data());
}

#[test]
fn test_invalid_layer_is_inert() {
    let layer = Layer::create_blank(4, 4, Palette::Rgb24, Gamma::Srgb).unwrap();
    layer.set_clip_id(1);
    layer.mark_invalid(true);

    layer
        .set_frame(5)
        .set_track(3)
        .set_palette(Palette::Rgba32)
        .set_size(100, 100)
        .set_image_ext("png");
    layer.set_pixel_data_packed(vec![0; 48]);

    assert_eq!(layer.status(), LayerStatus::Invalid);
    assert_eq!(layer.clip_id(), None);
    assert_eq!(layer.frame(), 0);
    assert_eq!(layer.track(), -1);
    assert_eq!(layer.palette(), Palette::None);
    assert_eq!(layer.width(), 0);
    assert!(layer.pixel_data().is_none());
    assert!(layer.image_ext().is_none());
    assert!(layer.is_video());

    // Repeating the cancellation changes nothing.
    layer.mark_invalid(true);
    layer.set_status(LayerStatus::Invalid);
    assert_eq!(layer.status(), LayerStatus::Invalid);
    assert_eq!(layer.ref_count(), 1);
}

#[test]
fn test_source_group_outlived() {
    let clip = Arc::new(Clip { name: "a".into() });
    let layer = Layer::new_for_frame(3, 42);
    layer.set_source_group(SourceGroupRef::new(&clip));
    assert!(layer.source_group_alive());
    assert_eq!(Arc::strong_count(&clip), 1);

    drop(clip);
    assert!(!layer.source_group_alive());
    assert!(layer.source_group().unwrap().upgrade().is_none());

    layer.unset_source_group();
    assert!(layer.source_group().is_none());
}

#[test]
fn test_invalid_layer_rejects_copy_and_transfer() {
    let ready =
        Layer::create_blank(4, 4, Palette::Rgb24, Gamma::Srgb).expect("Failed to create source");
    ready.set_status(LayerStatus::Ready);

    let layer = Layer::new_for_frame(1, 1);
    layer.mark_invalid(true);

    for _ in 0..2 {
        let err = Layer::copy(Some(&layer), &ready).expect_err("copy onto invalid layer");
        assert!(matches!(err, LayerError::Transfer(TransferError::InvalidDest)));
        assert_eq!(
            Layer::transfer_pixel_data(&layer, &ready),
            Err(TransferError::InvalidDest)
        );
        assert!(!layer.is_valid());
        assert_eq!(layer.status(), LayerStatus::Invalid);
        assert!(layer.pixel_data().is_none());

        // Clearing the flag must not revive a cancelled layer.
        layer.mark_invalid(false);
    }

    assert!(ready.has_pixel_data());
    assert_eq!(ready.status(), LayerStatus::Ready);
}

#[test]
fn test_reused_copy_dest_only_moves_forward() {
    let dest = Layer::new_for_frame(1, 1);
    let steps = [
        LayerStatus::Prepared,
        LayerStatus::Queued,
        LayerStatus::Loading,
        LayerStatus::Loaded,
        LayerStatus::Ready,
    ];
    let mut reached = Vec::new();
    for status in steps {
        let src = Layer::new_for_frame(2, 7);
        src.set_palette(Palette::Rgb24).set_size(2, 2);
        for next in steps.iter().skip(1).take_while(|s| s.as_u8() <= status.as_u8()) {
            src.set_status(*next);
        }
        assert_eq!(src.status(), status);
        Layer::copy(Some(&dest), &src).expect("Failed to copy forward");
        reached.push(dest.status());
    }
    assert_eq!(reached, steps);

    let behind = Layer::new_for_frame(3, 3);
    assert!(matches!(
        Layer::copy(Some(&dest), &behind),
        Err(LayerError::IllegalTransition { .. })
    ));
    assert_eq!(dest.status(), LayerStatus::Ready);
    assert_eq!(dest.clip_id(), Some(2));
}
