use i2cscript::number::*;

#[test]
fn test_prefix_detection() {
    assert_eq!(split_prefix("0x1f"), (Some(Radix::Hex), "1f"));
    assert_eq!(split_prefix("0d99"), (Some(Radix::Decimal), "99"));
    assert_eq!(split_prefix("0b101"), (Some(Radix::Binary), "101"));
    assert_eq!(split_prefix("1f"), (None, "1f"));
    assert_eq!(split_prefix("07"), (None, "07"));
    assert_eq!(split_prefix(""), (None, ""));
}

#[test]
fn test_octal_prefix_consumes_only_leading_zero() {
    // The `o` stays in front of the digit scan.
    assert_eq!(split_prefix("0o17"), (Some(Radix::Octal), "o17"));
    assert_eq!(parse_unsigned("0o17", Radix::Hex), None);
    assert_eq!(parse_unsigned("0o17", Radix::Auto), None);
}

#[test]
fn test_prefixed_literals() {
    assert_eq!(parse_unsigned("0x50", Radix::Decimal), Some((0x50, "")));
    assert_eq!(parse_unsigned("0d80 rest", Radix::Hex), Some((80, " rest")));
    assert_eq!(parse_unsigned("0b1010;", Radix::Hex), Some((0b1010, ";")));
}

#[test]
fn test_default_radix_without_prefix() {
    assert_eq!(parse_unsigned("50", Radix::Hex), Some((0x50, "")));
    assert_eq!(parse_unsigned("ff ", Radix::Hex), Some((0xff, " ")));
    assert_eq!(parse_unsigned("10", Radix::Decimal), Some((10, "")));
}

#[test]
fn test_auto_radix_follows_c_rules() {
    assert_eq!(parse_unsigned("10", Radix::Auto), Some((10, "")));
    assert_eq!(parse_unsigned("010", Radix::Auto), Some((8, "")));
    assert_eq!(parse_unsigned("0", Radix::Auto), Some((0, "")));
    // A leading zero picks octal, so `8` ends the run.
    assert_eq!(parse_unsigned("08", Radix::Auto), Some((0, "8")));
    // `0x` reaches the scanner only when no prefix was split off first;
    // here split_prefix takes it and the scan is plain hex.
    assert_eq!(parse_unsigned("0x1F", Radix::Auto), Some((0x1f, "")));
    assert_eq!(scan_unsigned("0X1F", Radix::Auto), Some((0x1f, "")));
}

#[test]
fn test_longest_digit_run() {
    assert_eq!(parse_unsigned("12zz", Radix::Hex), Some((0x12, "zz")));
    assert_eq!(parse_unsigned("0b1012", Radix::Hex), Some((0b101, "2")));
    assert_eq!(scan_unsigned("0xg", Radix::Hex), Some((0, "xg")));
}

#[test]
fn test_no_digits_fails() {
    assert_eq!(parse_unsigned("", Radix::Hex), None);
    assert_eq!(parse_unsigned("zz", Radix::Hex), None);
    assert_eq!(parse_unsigned("0x", Radix::Hex), None);
    assert_eq!(parse_unsigned("0d", Radix::Hex), None);
    assert_eq!(scan_signed("-", Radix::Decimal), None);
}

#[test]
fn test_sign_and_whitespace_like_strtoul() {
    assert_eq!(scan_unsigned("  7", Radix::Decimal), Some((7, "")));
    assert_eq!(scan_unsigned("-1", Radix::Decimal), Some((u64::MAX, "")));
    assert_eq!(scan_signed("-25x", Radix::Decimal), Some((-25, "x")));
    assert_eq!(scan_signed("+25", Radix::Decimal), Some((25, "")));
}

#[test]
fn test_overflow_saturates() {
    let huge = "ffffffffffffffffff";
    assert_eq!(scan_unsigned(huge, Radix::Hex), Some((u64::MAX, "")));
    assert_eq!(scan_signed(huge, Radix::Hex), Some((i64::MAX, "")));
    assert_eq!(scan_signed("-99999999999999999999", Radix::Decimal), Some((i64::MIN, "")));
}

#[test]
fn test_format_literal_round_trip() {
    for radix in [Radix::Binary, Radix::Decimal, Radix::Hex] {
        for value in [0u64, 1, 0x50, 0xff, 0x3ff, 123_456_789] {
            let text = format_literal(value, radix);
            assert!(text.starts_with(radix.prefix()));
            assert_eq!(parse_unsigned(&text, Radix::Hex), Some((value, "")), "{text}");
        }
    }
}

#[test]
fn test_format_literal_octal_does_not_round_trip() {
    let text = format_literal(0o17, Radix::Octal);
    assert_eq!(text, "0o17");
    assert_eq!(parse_unsigned(&text, Radix::Hex), None);
}
