/// Parse a byte count with an optional `k`/`m` suffix (binary multiples)
pub fn parse_byte_size(s: &str) -> std::result::Result<u64, String> {
    let lowered = s.trim().to_ascii_lowercase();
    let unit = lowered.strip_suffix('b').unwrap_or(&lowered);
    let (digits, multiplier) = if let Some(rest) = unit.strip_suffix('k') {
        (rest, 1024)
    } else if let Some(rest) = unit.strip_suffix('m') {
        (rest, 1024 * 1024)
    } else {
        (unit, 1)
    };
    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| format!("invalid size: {}", s))
}
