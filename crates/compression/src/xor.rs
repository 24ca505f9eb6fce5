//! Repeating-key XOR.

/// XORs `data` with `key`, cycling the key when `data` is longer.
///
/// An empty key leaves the input unchanged.
pub fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    xor_in_place(&mut out, key);
    out
}

/// In-place variant of [`xor`].
pub fn xor_in_place(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    for (byte, k) in data.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_key() {
        assert_eq!(xor(b"H4sI", b"\x0b"), b"C?xB");
    }

    #[test]
    fn key_cycles_over_long_input() {
        let out = xor(&[0, 0, 0, 0, 0], &[1, 2]);
        assert_eq!(out, vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn empty_key_is_identity() {
        assert_eq!(xor(b"abc", b""), b"abc");
    }

    #[test]
    fn xor_twice_restores_input() {
        let key = b"secret";
        let data = b"the quick brown fox jumps over the lazy dog";
        assert_eq!(xor(&xor(data, key), key), data.to_vec());
    }
}
