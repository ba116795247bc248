//! Plane-indexed framebuffer.
//!
//! Two bitplanes, each stored at the full 128x64 extent with one byte
//! per pixel (0 or 1). The active resolution is 64x32 or 128x64; pixel
//! addressing always uses the active width, so the same storage serves
//! both modes. A plane mask (bit 0 = plane 1, bit 1 = plane 2) gates
//! which planes clear/draw/scroll operations touch.

/// Low-resolution dimensions.
pub const LOW_RES_WIDTH: usize = 64;
pub const LOW_RES_HEIGHT: usize = 32;

/// High-resolution dimensions.
pub const HIGH_RES_WIDTH: usize = 128;
pub const HIGH_RES_HEIGHT: usize = 64;

const PLANE_COUNT: usize = 2;
const PLANE_PIXELS: usize = HIGH_RES_WIDTH * HIGH_RES_HEIGHT;

pub struct Display {
    planes: [Box<[u8]>; PLANE_COUNT],
    high_res: bool,
    plane_mask: u8,
    dirty: bool,
}

impl Display {
    #[must_use]
    pub fn new() -> Self {
        Self {
            planes: [
                vec![0; PLANE_PIXELS].into_boxed_slice(),
                vec![0; PLANE_PIXELS].into_boxed_slice(),
            ],
            high_res: false,
            plane_mask: 0b01,
            dirty: false,
        }
    }

    /// Active width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        if self.high_res { HIGH_RES_WIDTH } else { LOW_RES_WIDTH }
    }

    /// Active height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        if self.high_res { HIGH_RES_HEIGHT } else { LOW_RES_HEIGHT }
    }

    #[must_use]
    pub fn high_res(&self) -> bool {
        self.high_res
    }

    /// Switch resolution. Both planes are wiped in full, regardless of
    /// the plane mask, and the dirty flag is raised.
    pub fn set_high_res(&mut self, high_res: bool) {
        self.high_res = high_res;
        for plane in &mut self.planes {
            plane.fill(0);
        }
        self.dirty = true;
    }

    /// Select which planes subsequent clear/draw/scroll operations
    /// affect. Only the low two bits are meaningful. No opcode in the
    /// recognized set rewrites the mask; the setter is part of the
    /// library surface for callers that drive the display directly.
    pub fn set_plane_mask(&mut self, mask: u8) {
        self.plane_mask = mask & 0b11;
    }

    #[must_use]
    pub fn plane_mask(&self) -> u8 {
        self.plane_mask
    }

    /// Clear the selected plane(s) and raise the dirty flag.
    pub fn clear(&mut self) {
        for index in self.selected() {
            self.planes[index].fill(0);
        }
        self.dirty = true;
    }

    /// Read one pixel from the active region of a plane.
    #[must_use]
    pub fn pixel(&self, plane: usize, x: usize, y: usize) -> u8 {
        assert!(x < self.width() && y < self.height());
        self.planes[plane][y * self.width() + x]
    }

    /// The active region of plane 1, row-major, one byte per pixel.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.planes[0][..self.width() * self.height()]
    }

    /// The active region of an arbitrary plane.
    #[must_use]
    pub fn plane(&self, plane: usize) -> &[u8] {
        &self.planes[plane][..self.width() * self.height()]
    }

    /// XOR an 8-wide sprite into the selected plane(s) at (x, y), one
    /// byte per row, most significant bit leftmost. Coordinates wrap
    /// modulo the active dimensions. Returns 1 if any pixel flipped
    /// from set to clear.
    pub fn blit_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> u8 {
        let (w, h) = (self.width(), self.height());
        let mut collision = 0;
        for index in self.selected() {
            let plane = &mut self.planes[index];
            for (row, &bits) in rows.iter().enumerate() {
                let py = (y + row) % h;
                for col in 0..8 {
                    if bits & (0x80 >> col) == 0 {
                        continue;
                    }
                    let px = (x + col) % w;
                    let cell = &mut plane[py * w + px];
                    if *cell == 1 {
                        collision = 1;
                    }
                    *cell ^= 1;
                }
            }
        }
        self.dirty = true;
        collision
    }

    /// Scroll the selected plane(s) down by `n` rows, zero-filling the
    /// vacated rows. A zero count is a no-op and leaves dirty alone.
    pub fn scroll_down(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (w, h) = (self.width(), self.height());
        let n = n.min(h);
        for index in self.selected() {
            let plane = &mut self.planes[index];
            plane.copy_within(0..(h - n) * w, n * w);
            plane[..n * w].fill(0);
        }
        self.dirty = true;
    }

    /// Scroll the selected plane(s) up by `n` rows.
    pub fn scroll_up(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (w, h) = (self.width(), self.height());
        let n = n.min(h);
        for index in self.selected() {
            let plane = &mut self.planes[index];
            plane.copy_within(n * w..h * w, 0);
            plane[(h - n) * w..h * w].fill(0);
        }
        self.dirty = true;
    }

    /// Scroll the selected plane(s) right by `step` pixels.
    pub fn scroll_right(&mut self, step: usize) {
        let (w, h) = (self.width(), self.height());
        let step = step.min(w);
        for index in self.selected() {
            let plane = &mut self.planes[index];
            for y in 0..h {
                let row = &mut plane[y * w..(y + 1) * w];
                row.copy_within(0..w - step, step);
                row[..step].fill(0);
            }
        }
        self.dirty = true;
    }

    /// Scroll the selected plane(s) left by `step` pixels.
    pub fn scroll_left(&mut self, step: usize) {
        let (w, h) = (self.width(), self.height());
        let step = step.min(w);
        for index in self.selected() {
            let plane = &mut self.planes[index];
            for y in 0..h {
                let row = &mut plane[y * w..(y + 1) * w];
                row.copy_within(step..w, 0);
                row[w - step..].fill(0);
            }
        }
        self.dirty = true;
    }

    /// Check and clear the dirty flag. The engine only ever sets it;
    /// the presenting side consumes it here.
    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }

    fn selected(&self) -> impl Iterator<Item = usize> + use<> {
        let mask = self.plane_mask;
        (0..PLANE_COUNT).filter(move |p| mask & (1 << p) != 0)
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_low_res_and_clean() {
        let mut d = Display::new();
        assert_eq!(d.width(), 64);
        assert_eq!(d.height(), 32);
        assert_eq!(d.plane_mask(), 0b01);
        assert!(!d.take_dirty());
    }

    #[test]
    fn blit_sets_pixels_without_collision() {
        let mut d = Display::new();
        let collision = d.blit_sprite(4, 2, &[0b1010_0001]);
        assert_eq!(collision, 0);
        assert_eq!(d.pixel(0, 4, 2), 1);
        assert_eq!(d.pixel(0, 5, 2), 0);
        assert_eq!(d.pixel(0, 6, 2), 1);
        assert_eq!(d.pixel(0, 11, 2), 1);
        assert!(d.take_dirty());
    }

    #[test]
    fn blit_reports_collision_and_is_self_inverse() {
        let mut d = Display::new();
        assert_eq!(d.blit_sprite(10, 10, &[0xFF, 0x81]), 0);
        assert_eq!(d.blit_sprite(10, 10, &[0xFF, 0x81]), 1);
        assert!(d.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn blit_wraps_both_axes() {
        let mut d = Display::new();
        d.blit_sprite(62, 31, &[0b1100_0000, 0b1100_0000]);
        assert_eq!(d.pixel(0, 62, 31), 1);
        assert_eq!(d.pixel(0, 63, 31), 1);
        assert_eq!(d.pixel(0, 62, 0), 1); // row wrapped to top
        assert_eq!(d.pixel(0, 63, 0), 1);
    }

    #[test]
    fn blit_wraps_start_coordinates() {
        let mut d = Display::new();
        d.blit_sprite(70, 37, &[0b1000_0000]);
        assert_eq!(d.pixel(0, 6, 5), 1);
    }

    #[test]
    fn clear_wipes_selected_plane_and_marks_dirty() {
        let mut d = Display::new();
        d.blit_sprite(0, 0, &[0xFF]);
        let _ = d.take_dirty();
        d.clear();
        assert!(d.pixels().iter().all(|&p| p == 0));
        assert!(d.take_dirty());
    }

    #[test]
    fn scroll_down_shifts_rows_and_zero_fills() {
        let mut d = Display::new();
        d.blit_sprite(0, 0, &[0xFF]);
        d.scroll_down(3);
        assert_eq!(d.pixel(0, 0, 0), 0);
        assert_eq!(d.pixel(0, 0, 3), 1);
        assert_eq!(d.pixel(0, 7, 3), 1);
    }

    #[test]
    fn scroll_up_shifts_rows_and_zero_fills() {
        let mut d = Display::new();
        d.blit_sprite(0, 5, &[0xFF]);
        d.scroll_up(2);
        assert_eq!(d.pixel(0, 0, 5), 0);
        assert_eq!(d.pixel(0, 0, 3), 1);
        // bottom rows vacated
        assert_eq!(d.pixel(0, 0, 31), 0);
    }

    #[test]
    fn scroll_zero_rows_is_a_no_op() {
        let mut d = Display::new();
        d.blit_sprite(0, 0, &[0xFF]);
        let _ = d.take_dirty();
        d.scroll_down(0);
        d.scroll_up(0);
        assert_eq!(d.pixel(0, 0, 0), 1);
        assert!(!d.take_dirty());
    }

    #[test]
    fn blit_of_an_empty_sprite_still_marks_dirty() {
        let mut d = Display::new();
        assert_eq!(d.blit_sprite(0, 0, &[0x00]), 0);
        assert!(d.pixels().iter().all(|&p| p == 0));
        assert!(d.take_dirty());
    }

    #[test]
    fn scroll_right_and_left_move_columns() {
        let mut d = Display::new();
        d.blit_sprite(8, 0, &[0b1000_0000]);
        d.scroll_right(4);
        assert_eq!(d.pixel(0, 8, 0), 0);
        assert_eq!(d.pixel(0, 12, 0), 1);
        d.scroll_left(4);
        assert_eq!(d.pixel(0, 8, 0), 1);
        assert_eq!(d.pixel(0, 12, 0), 0);
    }

    #[test]
    fn plane_mask_gates_operations() {
        let mut d = Display::new();
        d.set_plane_mask(0b10);
        d.blit_sprite(0, 0, &[0x80]);
        assert_eq!(d.plane(1)[0], 1);
        assert_eq!(d.pixels()[0], 0);

        // plane 1 untouched by a clear aimed at plane 2
        d.set_plane_mask(0b01);
        d.blit_sprite(0, 0, &[0x80]);
        d.set_plane_mask(0b10);
        d.clear();
        assert_eq!(d.pixels()[0], 1);
        assert_eq!(d.plane(1)[0], 0);
    }

    #[test]
    fn resolution_switch_wipes_everything() {
        let mut d = Display::new();
        d.blit_sprite(0, 0, &[0xFF]);
        let _ = d.take_dirty();
        d.set_high_res(true);
        assert_eq!(d.width(), 128);
        assert_eq!(d.height(), 64);
        assert!(d.pixels().iter().all(|&p| p == 0));
        assert!(d.take_dirty());
        d.set_high_res(false);
        assert_eq!(d.width(), 64);
        assert!(d.take_dirty());
    }
}
