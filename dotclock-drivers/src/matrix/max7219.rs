//! MAX7219/MAX7221 LED matrix chain (bit-banged)
//!
//! Each chip drives one 8x8 cell. Chips are daisy-chained: data shifted into
//! the first chip falls through to the next, so one transaction carries a
//! 16-bit (opcode, data) word for every chip in the chain.
//!
//! # Wire Protocol
//!
//! - Select (CS/LOAD) low for the whole transaction
//! - Per bit, MSB first: clock low, set data, clock high
//! - 2 bytes per device, the farthest device (`N-1`) first
//! - Select high latches every chip's word
//!
//! Chips not addressed by a command receive the no-op opcode, which leaves
//! their registers untouched.

use dotclock_core::config::{MAX_DEVICES, MAX_INTENSITY};
use dotclock_core::traits::LedMatrix;
use dotclock_hal::OutputPin;
use heapless::Vec;

/// MAX7219 register addresses
pub mod op {
    /// No operation (fills the words of devices not addressed)
    pub const NOOP: u8 = 0x00;
    /// Row 0 register; rows 1..=7 follow
    pub const DIGIT0: u8 = 0x01;
    /// BCD decode mode
    pub const DECODE_MODE: u8 = 0x09;
    /// Brightness (0-15)
    pub const INTENSITY: u8 = 0x0A;
    /// Number of scanned rows minus one
    pub const SCAN_LIMIT: u8 = 0x0B;
    /// 0 = shutdown, 1 = normal operation
    pub const SHUTDOWN: u8 = 0x0C;
    /// 1 = all LEDs on
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// Rows per device
pub const ROWS: u8 = 8;

/// Highest scan limit value (all eight rows)
pub const MAX_SCAN_LIMIT: u8 = 7;

/// Software copy of one device's registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Row registers, bit 7 = column 0
    pub rows: [u8; ROWS as usize],
    /// Brightness (0-15)
    pub intensity: u8,
    /// Scan limit (0-7)
    pub scan_limit: u8,
    /// Normal operation (false = shutdown)
    pub active: bool,
}

/// MAX7219 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixError {
    /// Chain length outside 1..=MAX_DEVICES
    InvalidChainLength,
}

/// Driver for a chain of MAX7219 devices
///
/// Every command is validated first; out of range arguments are ignored
/// without bus traffic. The register mirror always matches what the last
/// transaction wrote.
pub struct Max7219<DIN, CLK, CS> {
    din: DIN,
    clk: CLK,
    cs: CS,
    devices: Vec<DeviceState, MAX_DEVICES>,
    frame: [u8; 2 * MAX_DEVICES],
}

impl<DIN, CLK, CS> Max7219<DIN, CLK, CS>
where
    DIN: OutputPin,
    CLK: OutputPin,
    CS: OutputPin,
{
    /// Take the bus lines and configure `chain_length` devices
    ///
    /// Every device ends up with display test off, scan limit 7, no decode,
    /// all rows cleared and in shutdown.
    pub fn new(din: DIN, clk: CLK, cs: CS, chain_length: usize) -> Result<Self, MatrixError> {
        if chain_length == 0 || chain_length > MAX_DEVICES {
            return Err(MatrixError::InvalidChainLength);
        }

        let mut devices = Vec::new();
        devices
            .resize(chain_length, DeviceState::default())
            .map_err(|_| MatrixError::InvalidChainLength)?;

        let mut matrix = Self {
            din,
            clk,
            cs,
            devices,
            frame: [0; 2 * MAX_DEVICES],
        };
        matrix.cs.set_high();
        matrix.clk.set_low();
        matrix.configure();
        Ok(matrix)
    }

    fn configure(&mut self) {
        for device in 0..self.devices.len() {
            self.send(device, op::DISPLAY_TEST, 0);
            self.set_scan_limit(device, MAX_SCAN_LIMIT);
            self.send(device, op::DECODE_MODE, 0);
            self.clear(device);
            self.shutdown(device, true);
        }
    }

    /// Number of devices in the chain
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Mirrored state of a device
    pub fn state(&self, device: usize) -> Option<&DeviceState> {
        self.devices.get(device)
    }

    /// Mirrored value of one row register
    pub fn row(&self, device: usize, row: u8) -> Option<u8> {
        self.devices
            .get(device)
            .and_then(|d| d.rows.get(row as usize))
            .copied()
    }

    /// Enter (`true`) or leave shutdown
    pub fn shutdown(&mut self, device: usize, shutdown: bool) {
        self.set_power(device, !shutdown);
    }

    /// Switch a device between normal operation and shutdown
    pub fn set_power(&mut self, device: usize, active: bool) {
        let Some(state) = self.devices.get_mut(device) else {
            return;
        };
        state.active = active;
        self.send(device, op::SHUTDOWN, active as u8);
    }

    /// Set the brightness of a device (0-15)
    pub fn set_intensity(&mut self, device: usize, intensity: u8) {
        if intensity > MAX_INTENSITY {
            return;
        }
        let Some(state) = self.devices.get_mut(device) else {
            return;
        };
        state.intensity = intensity;
        self.send(device, op::INTENSITY, intensity);
    }

    /// Limit scanning to rows `0..=limit`
    pub fn set_scan_limit(&mut self, device: usize, limit: u8) {
        if limit > MAX_SCAN_LIMIT {
            return;
        }
        let Some(state) = self.devices.get_mut(device) else {
            return;
        };
        state.scan_limit = limit;
        self.send(device, op::SCAN_LIMIT, limit);
    }

    /// Write one row register
    pub fn set_row(&mut self, device: usize, row: u8, value: u8) {
        let Some(slot) = self
            .devices
            .get_mut(device)
            .and_then(|d| d.rows.get_mut(row as usize))
        else {
            return;
        };
        *slot = value;
        self.send(device, op::DIGIT0 + row, value);
    }

    /// Switch a single LED
    pub fn set_led(&mut self, device: usize, row: u8, column: u8, on: bool) {
        if column >= ROWS {
            return;
        }
        let Some(current) = self.row(device, row) else {
            return;
        };
        let mask = 0x80 >> column;
        let value = if on { current | mask } else { current & !mask };
        self.set_row(device, row, value);
    }

    /// Write one column; bit 7 of `value` is row 0
    pub fn set_column(&mut self, device: usize, column: u8, value: u8) {
        if column >= ROWS || device >= self.devices.len() {
            return;
        }
        for row in 0..ROWS {
            let on = (value >> (7 - row)) & 1 == 1;
            self.set_led(device, row, column, on);
        }
    }

    /// Clear every row of a device
    pub fn clear(&mut self, device: usize) {
        if device >= self.devices.len() {
            return;
        }
        for row in 0..ROWS {
            self.set_row(device, row, 0);
        }
    }

    /// Power every device on or off
    pub fn set_power_all(&mut self, active: bool) {
        for device in 0..self.devices.len() {
            self.set_power(device, active);
        }
    }

    /// Set every device's brightness
    pub fn set_intensity_all(&mut self, intensity: u8) {
        for device in 0..self.devices.len() {
            self.set_intensity(device, intensity);
        }
    }

    /// Clear every device
    pub fn clear_all(&mut self) {
        for device in 0..self.devices.len() {
            self.clear(device);
        }
    }

    /// Re-send every mirrored register of a device
    ///
    /// Recovers a chip that lost its state (brown-out, glitch on the bus)
    /// without changing the mirror.
    pub fn resync(&mut self, device: usize) {
        let Some(state) = self.devices.get(device).copied() else {
            return;
        };
        self.send(device, op::DISPLAY_TEST, 0);
        self.send(device, op::DECODE_MODE, 0);
        self.send(device, op::SCAN_LIMIT, state.scan_limit);
        self.send(device, op::INTENSITY, state.intensity);
        for (row, value) in (0..ROWS).zip(state.rows) {
            self.send(device, op::DIGIT0 + row, value);
        }
        self.send(device, op::SHUTDOWN, state.active as u8);
    }

    /// Shut every device down and hand back the bus lines
    pub fn release(mut self) -> (DIN, CLK, CS) {
        self.set_power_all(false);
        (self.din, self.clk, self.cs)
    }

    /// Shift one command to `device`, no-ops to everyone else
    fn send(&mut self, device: usize, opcode: u8, data: u8) {
        let count = self.devices.len();
        let frame = &mut self.frame[..2 * count];
        frame.fill(op::NOOP);

        // First word out ends up in the last device
        let slot = 2 * (count - 1 - device);
        frame[slot] = opcode;
        frame[slot + 1] = data;

        self.cs.set_low();
        for &byte in frame.iter() {
            for bit in (0..8).rev() {
                self.clk.set_low();
                self.din.set_state((byte >> bit) & 1 == 1);
                self.clk.set_high();
            }
        }
        self.cs.set_high();
    }
}

impl<DIN, CLK, CS> LedMatrix for Max7219<DIN, CLK, CS>
where
    DIN: OutputPin,
    CLK: OutputPin,
    CS: OutputPin,
{
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn set_row(&mut self, device: usize, row: u8, value: u8) {
        Max7219::set_row(self, device, row, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    const MAX_FRAMES: usize = 256;

    /// Decodes the three bus lines back into latched frames
    #[derive(Default)]
    struct Wire {
        din: bool,
        clk: bool,
        cs: bool,
        clock_pulses: u32,
        bits: Vec<bool, { 16 * MAX_DEVICES }>,
        frames: Vec<Vec<u8, { 2 * MAX_DEVICES }>, MAX_FRAMES>,
    }

    impl Wire {
        fn latch(&mut self) {
            let mut frame = Vec::new();
            for chunk in self.bits.chunks(8) {
                let byte = chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8);
                frame.push(byte).unwrap();
            }
            self.frames.push(frame).unwrap();
            self.bits.clear();
        }

        /// (device, opcode, data) words of one frame for a chain of `n`
        fn words(frame: &[u8], n: usize) -> Vec<(usize, u8, u8), MAX_DEVICES> {
            frame
                .chunks(2)
                .enumerate()
                .map(|(i, w)| (n - 1 - i, w[0], w[1]))
                .collect()
        }
    }

    #[derive(Clone, Copy)]
    enum Line {
        Din,
        Clk,
        Cs,
    }

    struct WirePin<'a> {
        wire: &'a RefCell<Wire>,
        line: Line,
    }

    impl OutputPin for WirePin<'_> {
        fn set_high(&mut self) {
            let mut wire = self.wire.borrow_mut();
            match self.line {
                Line::Din => wire.din = true,
                Line::Clk => {
                    if !wire.clk && !wire.cs {
                        let bit = wire.din;
                        wire.bits.push(bit).unwrap();
                        wire.clock_pulses += 1;
                    }
                    wire.clk = true;
                }
                Line::Cs => {
                    if !wire.cs {
                        wire.latch();
                    }
                    wire.cs = true;
                }
            }
        }

        fn set_low(&mut self) {
            let mut wire = self.wire.borrow_mut();
            match self.line {
                Line::Din => wire.din = false,
                Line::Clk => wire.clk = false,
                Line::Cs => wire.cs = false,
            }
        }

        fn is_set_high(&self) -> bool {
            let wire = self.wire.borrow();
            match self.line {
                Line::Din => wire.din,
                Line::Clk => wire.clk,
                Line::Cs => wire.cs,
            }
        }
    }

    type TestMatrix<'a> = Max7219<WirePin<'a>, WirePin<'a>, WirePin<'a>>;

    fn matrix(wire: &RefCell<Wire>, n: usize) -> TestMatrix<'_> {
        // Lines idle high so the first CS low is an edge
        wire.borrow_mut().cs = true;
        let pin = |line| WirePin { wire, line };
        let m = Max7219::new(pin(Line::Din), pin(Line::Clk), pin(Line::Cs), n).unwrap();
        let mut w = wire.borrow_mut();
        w.frames.clear();
        w.clock_pulses = 0;
        drop(w);
        m
    }

    #[test]
    fn test_chain_length_bounds() {
        let wire = RefCell::new(Wire::default());
        let pin = |line| WirePin { wire: &wire, line };
        assert_eq!(
            Max7219::new(pin(Line::Din), pin(Line::Clk), pin(Line::Cs), 0).err(),
            Some(MatrixError::InvalidChainLength)
        );
        assert_eq!(
            Max7219::new(pin(Line::Din), pin(Line::Clk), pin(Line::Cs), MAX_DEVICES + 1).err(),
            Some(MatrixError::InvalidChainLength)
        );
        assert!(wire.borrow().frames.is_empty());
    }

    #[test]
    fn test_configure_sequence() {
        let wire = RefCell::new(Wire::default());
        wire.borrow_mut().cs = true;
        let pin = |line| WirePin { wire: &wire, line };
        let m = Max7219::new(pin(Line::Din), pin(Line::Clk), pin(Line::Cs), 2).unwrap();

        let w = wire.borrow();
        // Per device: test off, scan limit, decode, 8 rows, shutdown
        assert_eq!(w.frames.len(), 2 * 12);
        assert_eq!(Wire::words(&w.frames[0], 2)[1], (0, op::DISPLAY_TEST, 0));
        assert_eq!(Wire::words(&w.frames[1], 2)[1], (0, op::SCAN_LIMIT, 7));
        assert_eq!(Wire::words(&w.frames[2], 2)[1], (0, op::DECODE_MODE, 0));
        assert_eq!(Wire::words(&w.frames[11], 2)[1], (0, op::SHUTDOWN, 0));
        assert_eq!(Wire::words(&w.frames[12], 2)[0], (1, op::DISPLAY_TEST, 0));
        drop(w);

        for device in 0..2 {
            let state = m.state(device).unwrap();
            assert_eq!(state.scan_limit, 7);
            assert_eq!(state.rows, [0; 8]);
            assert!(!state.active);
        }
    }

    #[test]
    fn test_set_row_addresses_only_target() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 4);

        m.set_row(1, 3, 0xA5);

        let w = wire.borrow();
        assert_eq!(w.frames.len(), 1);
        assert_eq!(w.clock_pulses, 16 * 4);
        let words = Wire::words(&w.frames[0], 4);
        for &(device, opcode, data) in &words {
            if device == 1 {
                assert_eq!((opcode, data), (op::DIGIT0 + 3, 0xA5));
            } else {
                assert_eq!((opcode, data), (op::NOOP, 0));
            }
        }
        drop(w);

        for device in 0..4 {
            for row in 0..8 {
                let expected = if (device, row) == (1, 3) { 0xA5 } else { 0 };
                assert_eq!(m.row(device, row), Some(expected));
            }
        }
    }

    #[test]
    fn test_farthest_device_shifted_first() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 3);

        m.set_row(2, 0, 0x81);
        m.set_row(0, 7, 0x18);

        let w = wire.borrow();
        assert_eq!(&w.frames[0][..2], &[op::DIGIT0, 0x81]);
        assert_eq!(&w.frames[1][4..], &[op::DIGIT0 + 7, 0x18]);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 2);
        let before = [*m.state(0).unwrap(), *m.state(1).unwrap()];

        m.set_row(2, 0, 0xFF);
        m.set_row(0, 8, 0xFF);
        m.set_intensity(0, 16);
        m.set_scan_limit(1, 8);
        m.set_power(5, true);
        m.set_led(0, 0, 8, true);
        m.set_column(0, 9, 0xFF);
        m.clear(3);
        m.resync(2);

        assert!(wire.borrow().frames.is_empty());
        assert_eq!([*m.state(0).unwrap(), *m.state(1).unwrap()], before);
        assert_eq!(m.row(0, 8), None);
        assert!(m.state(2).is_none());
    }

    #[test]
    fn test_power_and_intensity() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 2);

        m.set_power(1, true);
        m.set_intensity(1, 15);
        m.shutdown(1, true);

        let w = wire.borrow();
        assert_eq!(Wire::words(&w.frames[0], 2)[0], (1, op::SHUTDOWN, 1));
        assert_eq!(Wire::words(&w.frames[1], 2)[0], (1, op::INTENSITY, 15));
        assert_eq!(Wire::words(&w.frames[2], 2)[0], (1, op::SHUTDOWN, 0));
        drop(w);

        let state = m.state(1).unwrap();
        assert_eq!(state.intensity, 15);
        assert!(!state.active);
    }

    #[test]
    fn test_set_led_and_column() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 1);

        m.set_led(0, 2, 0, true);
        m.set_led(0, 2, 7, true);
        assert_eq!(m.row(0, 2), Some(0x81));
        m.set_led(0, 2, 0, false);
        assert_eq!(m.row(0, 2), Some(0x01));

        m.set_column(0, 1, 0b1010_0000);
        assert_eq!(m.row(0, 0), Some(0x40));
        assert_eq!(m.row(0, 1), Some(0x00));
        assert_eq!(m.row(0, 2), Some(0x41));
    }

    #[test]
    fn test_all_variants_touch_every_device() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 3);

        m.set_row(0, 0, 0xFF);
        m.set_row(2, 5, 0x0F);
        m.set_power_all(true);
        m.set_intensity_all(4);
        m.clear_all();

        for device in 0..3 {
            let state = m.state(device).unwrap();
            assert!(state.active);
            assert_eq!(state.intensity, 4);
            assert_eq!(state.rows, [0; 8]);
        }
        // 2 rows + 3 power + 3 intensity + 24 rows cleared
        assert_eq!(wire.borrow().frames.len(), 32);
    }

    #[test]
    fn test_resync_replays_mirror() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 2);
        m.set_intensity(0, 9);
        m.set_row(0, 4, 0x3C);
        m.set_power(0, true);
        let before = *m.state(0).unwrap();
        wire.borrow_mut().frames.clear();

        m.resync(0);

        assert_eq!(*m.state(0).unwrap(), before);
        let w = wire.borrow();
        let sent: Vec<(u8, u8), 16> = w
            .frames
            .iter()
            .map(|f| {
                let (_, opcode, data) = Wire::words(f, 2)[1];
                (opcode, data)
            })
            .collect();
        assert!(sent.contains(&(op::INTENSITY, 9)));
        assert!(sent.contains(&(op::DIGIT0 + 4, 0x3C)));
        assert_eq!(sent.last(), Some(&(op::SHUTDOWN, 1)));
        assert!(w.frames.iter().all(|f| Wire::words(f, 2)[0] == (1, op::NOOP, 0)));
    }

    #[test]
    fn test_release_shuts_down() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 2);
        m.set_power_all(true);

        let (_din, _clk, cs) = m.release();
        assert!(cs.is_set_high());

        let w = wire.borrow();
        let last_two = &w.frames[w.frames.len() - 2..];
        assert_eq!(Wire::words(&last_two[0], 2)[1], (0, op::SHUTDOWN, 0));
        assert_eq!(Wire::words(&last_two[1], 2)[0], (1, op::SHUTDOWN, 0));
    }

    #[test]
    fn test_led_matrix_trait() {
        let wire = RefCell::new(Wire::default());
        let mut m = matrix(&wire, 4);

        fn paint<M: LedMatrix>(matrix: &mut M) {
            let last = matrix.device_count() - 1;
            matrix.set_row(last, 0, 0x80);
        }
        paint(&mut m);
        assert_eq!(m.row(3, 0), Some(0x80));
    }
}
