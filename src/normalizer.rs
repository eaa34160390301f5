/// Normalizes a user-supplied ticker: trims and uppercases it. Returns `None`
/// when the result is empty or contains a character a ticker cannot carry;
/// nothing is silently dropped.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_ascii_uppercase();

    let valid = !symbol.is_empty()
        && !symbol.starts_with('.')
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '='));

    if valid { Some(symbol) } else { None }
}
