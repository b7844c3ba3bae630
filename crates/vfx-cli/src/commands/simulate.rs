//! Synthetic decode/convert/consume pipeline.
//!
//! Every frame gets a layer queued up front. A rayon pool plays the clip
//! source: it loads each layer, optionally converts it and marks it ready.
//! The calling thread plays the viewer, waiting on frames in order. Stage
//! timings come from each layer's ledger.

use crate::SimulateArgs;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vfx_core::Palette;
use vfx_layer::{
    ClipSourceGroup, Layer, LayerConfig, LayerError, LayerKind, LayerStatus, PixelData,
    PixelDescriptor, SourceGroupRef, Stage,
};

struct SyntheticClip {
    name: String,
}

impl ClipSourceGroup for SyntheticClip {
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Default)]
struct StageStats {
    count: u32,
    total: Duration,
    max: Duration,
}

/// Runs the pipeline and prints a timing report.
pub fn run(args: SimulateArgs, config: LayerConfig, verbose: bool) -> Result<()> {
    if args.frames <= 0 {
        bail!("--frames must be positive, got {}", args.frames);
    }
    let clip = Arc::new(SyntheticClip {
        name: format!("clip{}", args.clip),
    });
    let layers: Vec<Layer> = (0..args.frames)
        .map(|frame| {
            let layer = Layer::builder(LayerKind::Video)
                .config(config.clone())
                .clip(args.clip, frame)
                .prepared()
                .build();
            layer
                .set_source_group(SourceGroupRef::new(&clip))
                .set_palette(args.palette)
                .set_size(args.palette.macropixels_for(args.width), args.height)
                .enable_timing()
                .set_status(LayerStatus::Queued);
            layer
        })
        .collect();

    if let Some(n) = args.cancel_every.filter(|n| *n > 0) {
        for layer in layers.iter().filter(|l| l.frame() % n == n - 1) {
            layer.mark_invalid(true);
        }
    }

    let started = Instant::now();
    let (produced, consumed) = thread::scope(|s| {
        let producer = s.spawn(|| {
            layers
                .par_iter()
                .map(|layer| produce_or_cancel(layer, args.convert))
                .collect::<Vec<Result<()>>>()
        });
        let consumed = consume(&layers);
        (producer.join(), consumed)
    });
    let wall = started.elapsed();

    let produced = produced.map_err(|_| anyhow::anyhow!("producer thread panicked"))?;
    if let Some(err) = produced.into_iter().find_map(Result::err) {
        return Err(err);
    }
    let source = layers
        .first()
        .and_then(Layer::source_group)
        .and_then(|g| g.upgrade())
        .map(|g| g.label().to_string())
        .unwrap_or_default();
    report(&args, &source, &consumed, wall, verbose);

    for layer in &layers {
        if layer.ref_dec() != 0 {
            warn!(layer = %layer.id(), refs = layer.ref_count(), "layer still referenced");
        }
    }
    Ok(())
}

/// One consumed frame.
struct Consumed {
    frame: i64,
    status: LayerStatus,
    bytes: usize,
    stages: Vec<Stage>,
}

fn consume(layers: &[Layer]) -> Vec<Consumed> {
    layers
        .iter()
        .map(|layer| {
            let status = layer.wait_ready();
            let bytes = layer.pixel_data().map(|px| px.len_bytes()).unwrap_or(0);
            let stages = layer.timing().map(|t| t.stages()).unwrap_or_default();
            debug!(frame = layer.frame(), %status, bytes, "consumed");
            Consumed {
                frame: layer.frame(),
                status,
                bytes,
                stages,
            }
        })
        .collect()
}

fn produce_or_cancel(layer: &Layer, convert: Option<Palette>) -> Result<()> {
    let Some(guard) = layer.acquire() else {
        return Ok(());
    };
    let result = produce(&guard, convert)
        .with_context(|| format!("Failed to produce frame {}", guard.frame()));
    if result.is_err() {
        guard.mark_invalid(true);
    }
    result
}

fn produce(layer: &Layer, convert: Option<Palette>) -> Result<()> {
    if !layer.is_valid() {
        return Ok(());
    }
    if !advance(layer, LayerStatus::Loading)? {
        return Ok(());
    }
    let value = (layer.frame() % 251) as u8;
    if let Some(mut px) = layer.pixel_data_mut() {
        for plane in 0..px.plane_count() {
            if let Some(buf) = px.plane_mut(plane) {
                buf.fill(value);
            }
        }
    }
    if !advance(layer, LayerStatus::Loaded)? {
        return Ok(());
    }

    if let Some(target) = convert.filter(|p| *p != layer.palette()) {
        if !advance(layer, LayerStatus::Converting)? {
            return Ok(());
        }
        let mut desc = PixelDescriptor::with_alignment(
            target,
            target.macropixels_for(layer.width_pixels()),
            layer.height(),
            layer.config().rowstride_alignment,
        );
        desc.gamma = layer.gamma();
        let mut px = PixelData::zeroed(&desc)?;
        px.fill_black(&desc);
        layer.replace_pixels(desc, px)?;
    }

    advance(layer, LayerStatus::Ready)?;
    Ok(())
}

/// Moves `layer` to `to`. `Ok(false)` if it was cancelled on the way.
fn advance(layer: &Layer, to: LayerStatus) -> Result<bool> {
    match layer.try_set_status(to) {
        Ok(_) => Ok(true),
        Err(LayerError::IllegalTransition { from, .. }) if from == LayerStatus::Invalid => {
            debug!(layer = %layer.id(), %to, "cancelled");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn report(args: &SimulateArgs, source: &str, consumed: &[Consumed], wall: Duration, verbose: bool) {
    let ready = consumed
        .iter()
        .filter(|c| c.status == LayerStatus::Ready)
        .count();
    let bytes: u64 = consumed.iter().map(|c| c.bytes as u64).sum();

    println!(
        "{} frames {}x{} {}{}",
        consumed.len(),
        args.width,
        args.height,
        args.palette,
        args.convert
            .map(|p| format!(" -> {p}"))
            .unwrap_or_default()
    );
    println!("  Source:     {source}");
    println!("  Ready:      {ready}");
    println!("  Cancelled:  {}", consumed.len() - ready);
    println!("  Consumed:   {}", super::format_size(bytes));
    println!("  Wall time:  {:.2} ms", wall.as_secs_f64() * 1000.0);

    let mut stats: BTreeMap<(u8, u8), StageStats> = BTreeMap::new();
    let mut slowest: Option<(i64, Stage)> = None;
    for c in consumed {
        for stage in &c.stages {
            let d = stage.duration.as_duration();
            let entry = stats
                .entry((stage.from.as_u8(), stage.to.as_u8()))
                .or_default();
            entry.count += 1;
            entry.total += d;
            entry.max = entry.max.max(d);
            if slowest.is_none_or(|(_, s)| stage.duration > s.duration) {
                slowest = Some((c.frame, *stage));
            }
        }
        if verbose {
            let path: Vec<String> = c.stages.iter().map(|s| s.to.to_string()).collect();
            println!("    frame {:>5}: {} [{}]", c.frame, c.status, path.join(" > "));
        }
    }

    if stats.is_empty() {
        return;
    }
    println!("  Stages:");
    for ((from, to), s) in &stats {
        println!(
            "    {:>10} -> {:<10} n={:<5} avg {:>8.3} ms  max {:>8.3} ms",
            LayerStatus::from_u8(*from).to_string(),
            LayerStatus::from_u8(*to).to_string(),
            s.count,
            s.total.as_secs_f64() * 1000.0 / f64::from(s.count),
            s.max.as_secs_f64() * 1000.0,
        );
    }
    if let Some((frame, stage)) = slowest {
        println!(
            "  Slowest:    frame {frame} {} -> {} ({:.3} ms)",
            stage.from,
            stage.to,
            stage.duration.as_duration().as_secs_f64() * 1000.0
        );
    }
}
