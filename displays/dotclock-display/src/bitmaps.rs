//! Packed 1-bit icons, MSB = leftmost pixel

/// TV icon width in pixels
pub const TV_WIDTH: u32 = 8;

/// TV icon height in pixels
pub const TV_HEIGHT: u32 = 8;

/// TV icon, eyes open
pub const TV_OPEN: [u8; 8] = [
    0b0100_0010,
    0b0010_0100,
    0b1111_1111,
    0b1000_0001,
    0b1010_0101,
    0b1000_0001,
    0b1111_1111,
    0b0100_0010,
];

/// TV icon, eyes shut
pub const TV_BLINK: [u8; 8] = [
    0b0100_0010,
    0b0010_0100,
    0b1111_1111,
    0b1000_0001,
    0b1000_0001,
    0b1011_1101,
    0b1111_1111,
    0b0100_0010,
];

/// TV frame for a given second (alternates every second)
pub const fn tv_frame(second: u8) -> &'static [u8; 8] {
    if second % 2 == 1 {
        &TV_OPEN
    } else {
        &TV_BLINK
    }
}
