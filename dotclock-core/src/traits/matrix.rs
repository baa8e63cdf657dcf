//! LED matrix trait for chained 8x8 driver chips

/// A chain of 8x8 LED cells addressed row by row
///
/// Devices are numbered `0..device_count()`. Each row register holds one
/// byte, bit 7 being the leftmost LED of the row.
pub trait LedMatrix {
    /// Number of devices in the chain
    fn device_count(&self) -> usize;

    /// Write one row register of one device
    ///
    /// Out of range `device` or `row` must be ignored.
    fn set_row(&mut self, device: usize, row: u8, value: u8);
}

impl<T: LedMatrix + ?Sized> LedMatrix for &mut T {
    fn device_count(&self) -> usize {
        (**self).device_count()
    }

    fn set_row(&mut self, device: usize, row: u8, value: u8) {
        (**self).set_row(device, row, value);
    }
}
