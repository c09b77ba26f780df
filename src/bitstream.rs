//! Bit-level packing over a byte buffer.
//!
//! Bits fill each byte starting at the least significant bit, and
//! multi-bit fields are written least significant bit first. The last
//! byte is padded with zero bits.

#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bit(&mut self, bit: bool) {
        let place = self.bit_len % 8;
        if place == 0 {
            self.bytes.push(0);
        }
        if bit {
            // the push above guarantees a last byte
            if let Some(b) = self.bytes.last_mut() {
                *b |= 1 << place;
            }
        }
        self.bit_len += 1;
    }

    /// Appends the low `width` bits of `value`.
    pub fn write_bits(&mut self, value: u32, width: u32) {
        for i in 0..width.min(u32::BITS) {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    next_bit: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, next_bit: 0 }
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.next_bit / 8)?;
        let bit = (byte >> (self.next_bit % 8)) & 1 == 1;
        self.next_bit += 1;
        Some(bit)
    }

    /// Reads a `width`-bit field. Returns `None` if the stream runs out
    /// before the field is complete.
    pub fn read_bits(&mut self, width: u32) -> Option<u32> {
        let mut out = 0u32;
        for i in 0..width.min(u32::BITS) {
            if self.read_bit()? {
                out |= 1 << i;
            }
        }
        Some(out)
    }

    pub fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.next_bit)
    }
}
