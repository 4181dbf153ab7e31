//! Off-screen pixel buffer owned by the presentation side of the loop

/// Bytes per packed pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Resizable off-screen pixel buffer.
///
/// Pixels are packed `0x00RRGGBB` words, rows are contiguous with no
/// padding. The buffer is owned here for the lifetime of the loop; the
/// update call only borrows it for one invocation.
#[derive(Debug, Default)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut surface = Self::default();
        surface.resize(width, height);
        surface
    }

    /// Reallocate for a new client area.
    ///
    /// The new buffer is allocated before the old one is released, so there
    /// is never a moment without a valid buffer. Zero-sized requests (a
    /// minimized window) are ignored and the prior buffer is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.width && height == self.height {
            return;
        }
        self.pixels = vec![0; width as usize * height as usize];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// The buffer as raw bytes, for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_allocates_width_height_times_four_bytes() {
        let mut surface = PixelSurface::default();
        surface.resize(0, 0);
        surface.resize(800, 600);

        assert_eq!(surface.width(), 800);
        assert_eq!(surface.height(), 600);
        assert_eq!(surface.as_bytes().len(), 800 * 600 * BYTES_PER_PIXEL);
        assert_eq!(surface.pitch(), 800 * BYTES_PER_PIXEL);
    }

    #[test]
    fn zero_sized_resize_keeps_prior_buffer() {
        let mut surface = PixelSurface::new(320, 240);
        surface.pixels_mut()[0] = 0x00FF_0000;

        surface.resize(0, 240);
        surface.resize(320, 0);

        assert_eq!(surface.width(), 320);
        assert_eq!(surface.height(), 240);
        assert_eq!(surface.pixels()[0], 0x00FF_0000);
    }

    #[test]
    fn resize_to_same_dimensions_preserves_contents() {
        let mut surface = PixelSurface::new(64, 64);
        surface.pixels_mut()[10] = 0x0000_FF00;
        surface.resize(64, 64);
        assert_eq!(surface.pixels()[10], 0x0000_FF00);
    }
}
