//! Palette table.

use crate::PalettesArgs;
use anyhow::Result;
use vfx_core::{Palette, ALL_PALETTES};
use vfx_layer::PixelDescriptor;

/// Prints every palette's plane layout, and plane sizes when a width is given.
pub fn run(args: PalettesArgs, verbose: bool) -> Result<()> {
    println!(
        "{:<10} {:>6} {:>6} {:>6} {:>8}  {}",
        "palette", "planes", "bytes", "pixels", "chroma", "flags"
    );
    for palette in ALL_PALETTES {
        println!(
            "{:<10} {:>6} {:>6} {:>6} {:>8}  {}",
            palette.name(),
            palette.plane_count(),
            palette.bytes_per_macropixel(),
            palette.pixels_per_macropixel(),
            format!("{:?}", palette.chroma_subsampling()).to_lowercase(),
            flags(palette),
        );
        if let Some(width) = args.width {
            print_planes(palette, width, args.height, verbose);
        }
    }
    Ok(())
}

fn flags(palette: Palette) -> String {
    let mut out = Vec::new();
    if palette.is_planar() {
        out.push("planar");
    }
    if palette.has_alpha() {
        out.push("alpha");
    }
    if palette.is_float() {
        out.push("float");
    }
    out.join(",")
}

fn print_planes(palette: Palette, width: u32, height: u32, verbose: bool) {
    let desc = PixelDescriptor::new(palette, palette.macropixels_for(width), height);
    for (plane, size) in desc.plane_sizes().into_iter().enumerate() {
        let (row_bytes, rows) = desc.plane_geometry(plane);
        if verbose {
            println!(
                "    plane {plane}: {row_bytes} bytes x {rows} rows, stride {}, {size} bytes",
                desc.rowstrides[plane]
            );
        } else {
            println!("    plane {plane}: {}", super::format_size(size as u64));
        }
    }
}
