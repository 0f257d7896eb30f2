/// A borrowed bit string: packed bits, most significant bit first, with
/// `unused_bits` padding bits at the end of the last octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitString<'a> {
    pub unused_bits: u8,
    pub data: &'a [u8],
}

impl<'a> BitString<'a> {
    pub const fn new(unused_bits: u8, data: &'a [u8]) -> Self {
        Self { unused_bits, data }
    }

    /// Number of meaningful bits.
    pub fn len(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.unused_bits as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit `index`, counting from the first (most significant) bit.
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len() {
            return None;
        }
        let byte = self.data[index / 8];
        Some(byte & (0x80 >> (index % 8)) != 0)
    }
}

/// Packs `bits` MSB first into `out`, returning the unused-bit count and the
/// number of octets used.
pub fn pack_bits(bits: &[bool], out: &mut [u8]) -> Option<(u8, usize)> {
    let octets = bits.len().div_ceil(8);
    if octets > out.len() {
        return None;
    }
    out[..octets].fill(0);
    for (i, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
        out[i / 8] |= 0x80 >> (i % 8);
    }
    let unused = (octets * 8 - bits.len()) as u8;
    Some((unused, octets))
}
