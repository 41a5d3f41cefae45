/// Longest file name most Linux filesystems accept (NAME_MAX).
const NAME_MAX: usize = 255;

/// Makes `name` safe as a single path component.
///
/// Path separators, NUL and control characters become `_`; leading and
/// trailing dots and whitespace are trimmed; the result is cut to 255 bytes
/// on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
