/// Sensirion CRC-8: polynomial 0x31, initialization 0xFF, no final XOR.
pub(crate) fn crc(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in data.iter().copied() {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 == 0 {
                crc <<= 1;
            } else {
                crc = (crc << 1) ^ 0x31u8;
            }
        }
    }
    crc
}

/// Encodes an argument word as it is sent on the wire: big-endian, followed by its CRC.
pub(crate) fn word_with_crc(word: u16) -> [u8; 3] {
    let [hi, lo] = word.to_be_bytes();
    [hi, lo, crc(&[hi, lo])]
}
