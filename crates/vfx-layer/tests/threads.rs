//! Cross-thread reference counting and status waiting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use vfx_core::{Gamma, Palette};
use vfx_layer::{Layer, LayerKind, LayerStatus};

#[test]
fn test_concurrent_refs_destroy_once() {
    let layer = Layer::new_for_frame(3, 42);
    let barrier = Arc::new(Barrier::new(2));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let layer = layer.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..10_000 {
                    layer.ref_inc();
                    layer.ref_dec();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().expect("worker panicked");
    }

    assert_eq!(layer.ref_count(), 1);
    assert!(!layer.is_destroyed());
    assert_eq!(layer.ref_dec(), 0);
    assert!(layer.is_destroyed());
}

#[test]
fn test_two_readers_then_creator_release() {
    let layer = Layer::new_for_frame(3, 42);
    layer.set_status(LayerStatus::Queued);
    let taken = Arc::new(Barrier::new(3));
    let checked = Arc::new(Barrier::new(3));

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let layer = layer.clone();
            let taken = Arc::clone(&taken);
            let checked = Arc::clone(&checked);
            thread::spawn(move || {
                layer.ref_inc();
                taken.wait();
                checked.wait();
                layer.ref_dec()
            })
        })
        .collect();

    taken.wait();
    assert_eq!(layer.ref_count(), 3);
    checked.wait();
    let mut remaining: Vec<i32> = readers.into_iter().map(|r| r.join().unwrap()).collect();
    remaining.sort_unstable();
    assert_eq!(remaining, vec![1, 2]);
    assert!(!layer.is_destroyed());

    assert_eq!(layer.ref_dec(), 0);
    assert!(layer.is_destroyed());
    assert_eq!(layer.status(), LayerStatus::Invalid);
}

#[test]
fn test_last_release_races() {
    // Many holders dropping their references at once; exactly one of them
    // observes the count reach zero.
    const HOLDERS: usize = 8;
    let layer = Layer::create_blank(16, 16, Palette::Rgba32, Gamma::Srgb).unwrap();
    for _ in 1..HOLDERS {
        layer.ref_inc();
    }
    let zeros = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(HOLDERS));

    let workers: Vec<_> = (0..HOLDERS)
        .map(|_| {
            let layer = layer.clone();
            let zeros = Arc::clone(&zeros);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if layer.ref_dec() == 0 {
                    zeros.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(zeros.load(Ordering::SeqCst), 1);
    assert!(layer.is_destroyed());
    assert_eq!(layer.ref_inc(), 0);
}

#[test]
fn test_wait_ready_wakes_on_ready() {
    let layer = Layer::new_for_frame(1, 0);
    layer.set_palette(Palette::Rgb24).set_size(32, 32);
    layer.set_status(LayerStatus::Queued);

    let producer = {
        let layer = layer.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            layer.set_status(LayerStatus::Loading);
            layer.pixel_data_mut().unwrap().plane_mut(0).unwrap().fill(200);
            layer.set_status(LayerStatus::Loaded);
            layer.set_status(LayerStatus::Ready);
        })
    };

    assert_eq!(layer.wait_ready(), LayerStatus::Ready);
    assert!(layer.pixel_data().unwrap().plane(0).unwrap().iter().all(|&b| b == 200));
    producer.join().unwrap();
}

#[test]
fn test_wait_ready_wakes_on_cancel() {
    let layer = Layer::new_for_frame(1, 0);
    let consumer = {
        let layer = layer.clone();
        thread::spawn(move || layer.wait_ready())
    };
    thread::sleep(Duration::from_millis(10));
    layer.mark_invalid(true);
    assert_eq!(consumer.join().unwrap(), LayerStatus::Invalid);
}

#[test]
fn test_wait_ready_wakes_on_destroy() {
    let layer = Layer::new(LayerKind::Video);
    let consumer = {
        let layer = layer.clone();
        thread::spawn(move || layer.wait_for(LayerStatus::Loaded))
    };
    thread::sleep(Duration::from_millis(10));
    layer.ref_dec();
    assert_eq!(consumer.join().unwrap(), LayerStatus::Invalid);
}

#[test]
fn test_wait_for_intermediate_status() {
    let layer = Layer::new_for_frame(2, 9);
    layer.set_status(LayerStatus::Queued);
    let waiter = {
        let layer = layer.clone();
        thread::spawn(move || layer.wait_for(LayerStatus::Loading))
    };
    thread::sleep(Duration::from_millis(10));
    layer.set_status(LayerStatus::Loading);
    let seen = waiter.join().unwrap();
    assert!(seen.has_reached(LayerStatus::Loading));
}

#[test]
fn test_concurrent_readers_see_consistent_shape() {
    let layer = Layer::create_blank(64, 64, Palette::Rgb24, Gamma::Srgb).unwrap();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let layer = layer.clone();
            thread::spawn(move || {
                let guard = layer.acquire().expect("layer alive");
                for _ in 0..100 {
                    let desc = guard.pixel_descriptor().unwrap();
                    let bytes = guard.pixel_data().map(|p| p.len_bytes()).unwrap_or(0);
                    assert!(bytes == 0 || bytes == desc.size_in_bytes());
                }
            })
        })
        .collect();
    for _ in 0..50 {
        let px = layer.nullify_pixel_data().unwrap_or_default();
        layer.set_pixel_data(px);
    }
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(layer.ref_count(), 1);
}
