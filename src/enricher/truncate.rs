use std::borrow::Cow;

/// Longest string that passes through unchanged.
pub const OUTPUT_LENGTH: usize = 1024;
/// Characters kept from an over-long string before the ellipsis.
pub const MAX_LENGTH: usize = 1021;

const ELLIPSIS: &str = "...";

/// Bounds a string to `OUTPUT_LENGTH` characters.
///
/// Longer input keeps its first `MAX_LENGTH` characters followed by `...`.
/// Lengths are counted in `char`s so multi-byte text is never split.
pub fn truncate(input: &str) -> Cow<'_, str> {
    match input.char_indices().nth(OUTPUT_LENGTH) {
        None => Cow::Borrowed(input),
        Some(_) => {
            let cut = input
                .char_indices()
                .nth(MAX_LENGTH)
                .map(|(idx, _)| idx)
                .unwrap_or(input.len());
            let mut out = String::with_capacity(cut + ELLIPSIS.len());
            out.push_str(&input[..cut]);
            out.push_str(ELLIPSIS);
            Cow::Owned(out)
        }
    }
}
