//! Blank layer description.

use crate::BlankArgs;
use anyhow::{Context, Result};
use vfx_layer::{Layer, LayerConfig};

/// Creates a blank layer from `args` and prints its descriptor.
pub fn run(args: BlankArgs, config: LayerConfig, verbose: bool) -> Result<()> {
    let layer = Layer::builder(vfx_layer::LayerKind::Video)
        .config(config)
        .build_blank(args.width, args.height, args.palette, args.gamma)
        .with_context(|| {
            format!(
                "Failed to create {}x{} {} layer",
                args.width, args.height, args.palette
            )
        })?;
    if args.black {
        layer.fill_blank();
    }

    println!("layer {}", layer.id());
    println!("  Status:     {}", layer.status());
    println!("  Palette:    {}", layer.palette());
    println!("  Gamma:      {}", layer.gamma());
    println!(
        "  Size:       {}x{} ({} macropixels wide)",
        layer.width_pixels(),
        layer.height(),
        layer.width()
    );
    println!("  Rowstrides: {:?}", layer.rowstrides());
    println!(
        "  Bytes:      {}",
        super::format_size(layer.size_in_bytes() as u64)
    );

    if verbose {
        if let Some(px) = layer.pixel_data() {
            for (i, plane) in px.planes().iter().enumerate() {
                let head: Vec<u8> = plane.iter().take(8).copied().collect();
                println!("  plane {i}: {} bytes, starts {head:?}", plane.len());
            }
        }
    }

    layer.ref_dec();
    Ok(())
}
