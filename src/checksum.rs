// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

/// One-byte checksum of a 16-bit quantity: high byte plus low byte, mod 256.
///
/// This is what the interface echoes for every header:code pair it receives.
pub fn short_checksum(word: u16) -> u8 {
    (((word >> 8) + (word & 0xFF)) & 0xFF) as u8
}

/// Byte-sum of a slice, mod 256.
pub fn sum_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_checksum_known_values() {
        assert_eq!(short_checksum(0xFFFF), 0xFE);
        assert_eq!(short_checksum(0x9876), 0x0E);
        assert_eq!(short_checksum(0x1234), 0x46);
        assert_eq!(short_checksum(0x0000), 0x00);
    }

    #[test]
    fn test_sum_checksum_matches_short_checksum() {
        assert_eq!(sum_checksum(&[0x98, 0x76]), short_checksum(0x9876));
        assert_eq!(sum_checksum(&[]), 0);
        assert_eq!(sum_checksum(&[0x80, 0x80, 0x01]), 0x01);
    }
}
