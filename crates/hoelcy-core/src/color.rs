/// Tag colors handed out to categories.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#95E1D3", "#F38181", "#AA96DA", "#FCBAD3", "#FFFFD2", "#A8D8EA",
];

const UNKNOWN_NAME: &str = "Unknown";

/// Picks a palette color for a category name.
///
/// The hash runs over UTF-16 code units with 32-bit shift semantics so a name
/// keeps the color it had in earlier clients of the same webhooks. Different
/// names may share a color.
pub fn category_color(name: Option<&str>) -> &'static str {
    let name = match name {
        Some(value) if !value.is_empty() => value,
        _ => UNKNOWN_NAME,
    };

    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        hash = i64::from(unit) + shifted - hash;
    }

    let idx = (hash.unsigned_abs() % CATEGORY_PALETTE.len() as u64) as usize;
    CATEGORY_PALETTE[idx]
}
