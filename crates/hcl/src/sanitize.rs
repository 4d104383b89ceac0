//! Name sanitizers and small value parsers shared by provider mappers.

/// Sanitize an arbitrary id into a Terraform local name.
///
/// Lowercases, maps every character outside `[a-z0-9_]` to `_`, trims
/// leading/trailing underscores, prefixes `r_` when the result starts with a
/// digit, and falls back to `resource` for an empty result. The output always
/// matches `[a-z_][a-z0-9_]*`.
#[must_use]
pub fn tf_name(id: &str) -> String {
    let mut name: String = id
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    name = name.trim_matches('_').to_string();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name = format!("r_{name}");
    }
    if name.is_empty() {
        name = "resource".to_string();
    }
    name
}

/// Sanitize a string into an S3 bucket name.
///
/// Lowercases, maps `_` and spaces to `-`, drops everything outside
/// `[a-z0-9.-]`, trims `.` and `-` from both ends and enforces the 3..=63
/// length window (over-long names are truncated, then re-trimmed). Returns an
/// empty string when no valid name can be produced.
#[must_use]
pub fn sanitize_bucket_name(input: &str) -> String {
    let mut name: String = input
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    name = name.trim_matches(['.', '-']).to_string();
    if name.len() > 63 {
        name.truncate(63);
        name = name.trim_end_matches(['.', '-']).to_string();
    }
    if name.len() < 3 {
        return String::new();
    }
    name
}

/// Parse a port range string of the form `"22"` or `"80-443"`.
///
/// A singleton decodes to equal bounds.
#[must_use]
pub fn parse_port_range(value: &str) -> Option<(u16, u16)> {
    let value = value.trim();
    match value.split_once('-') {
        Some((from, to)) => {
            let from = from.trim().parse().ok()?;
            let to = to.trim().parse().ok()?;
            Some((from, to))
        }
        None => {
            let port = value.parse().ok()?;
            Some((port, port))
        }
    }
}
