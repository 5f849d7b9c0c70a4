#[macro_export]
macro_rules! is_power_of_2 {
    ($x:expr) => {
        ($x) != 0 && ($x) & (($x) - 1) == 0
    };
}
#[macro_export]
macro_rules! round_up {
    ($x:expr, $y:expr) => {{
        debug_assert!(is_power_of_2!($y));
        (($x) + ($y) - 1) & (!($y) + 1)
    }};
}

#[cfg(test)]
#[test]
fn test_round_up() {
    crate::tests_init();

    assert_eq!(round_up!(128 * 128, 512), 16384);
    assert_eq!(round_up!(128 * 130, 512), 16896);
    assert_eq!(round_up!(92, 4096), 4096);
}

#[cfg(test)]
#[test]
fn test_is_power_of_2() {
    crate::tests_init();

    assert!(!is_power_of_2!(0));
    assert!(!is_power_of_2!(520));
    assert!(is_power_of_2!(512));
    assert!(is_power_of_2!(4096));
    assert!(!is_power_of_2!(4097));
}

/// Decodes a NUL terminated UTF-16LE string, replacing invalid code units.
pub fn decode_utf16le(buf: &[u8]) -> String {
    let units = buf
        .chunks_exact(2)
        .map(|x| u16::from_le_bytes([x[0], x[1]]))
        .take_while(|&x| x != 0);

    std::char::decode_utf16(units)
        .map(|x| x.unwrap_or(std::char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
#[test]
fn test_decode_utf16le() {
    crate::tests_init();

    assert_eq!(decode_utf16le(b"K\0E\0R\0N\0-\0A\0\0\0X\0"), "KERN-A");
    assert_eq!(decode_utf16le(b"\0\0"), "");
    assert_eq!(decode_utf16le(b"\x00\xD8a\0"), "\u{FFFD}a");
}
