//! Host-private hints carried by a layer.

use bitflags::bitflags;

bitflags! {
    /// Hints a host attaches to a layer's pixel descriptor.
    ///
    /// They never change how the layer itself behaves; producers read them
    /// to decide how much work to do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayerFlags: u32 {
        /// Only load pixels if the frame needs resizing.
        const LOAD_IF_RESIZE_NEEDED = 1 << 0;
        /// Work out the frame size and skip loading pixels.
        const SIZE_ONLY = 1 << 1;
        /// Do not deinterlace.
        const NO_DEINTERLACE = 1 << 2;
        /// Colour components are premultiplied by alpha.
        const ALPHA_PREMULTIPLIED = 1 << 3;
    }
}
