//! Upload file naming: `{slug}-{uuid}.{ext}`.

use uuid::Uuid;

/// Normalize a base file name: whitespace runs become `-`, parentheses and
/// any other character outside `[A-Za-z0-9_-]` are removed, and the result
/// is lower-cased.
pub fn slugify(base: &str) -> String {
    let mut out = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// Split `name` at its last `.` into base and lower-cased extension.
fn split_extension(name: &str) -> (&str, Option<String>) {
    match name.rsplit_once('.') {
        Some((base, ext)) => (base, Some(ext.to_lowercase())),
        None => (name, None),
    }
}

/// Build the upload name for `original` using the given unique token.
pub fn upload_file_name_with(original: &str, token: &Uuid) -> String {
    let (base, ext) = split_extension(original);
    let slug = slugify(base);
    match ext {
        Some(ext) => format!("{}-{}.{}", slug, token, ext),
        None => format!("{}-{}", slug, token),
    }
}

/// Build the upload name for `original` with a fresh random token.
pub fn upload_file_name(original: &str) -> String {
    upload_file_name_with(original, &Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Uuid {
        Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap()
    }

    #[test]
    fn test_slugify_rules() {
        assert_eq!(slugify("My Crowd  Photo (1)"), "my-crowd-photo-1");
        assert_eq!(slugify("stadium_2024-final"), "stadium_2024-final");
        assert_eq!(slugify("café & bar!"), "caf--bar");
    }

    #[test]
    fn test_capture_names() {
        assert_eq!(
            upload_file_name_with("capture.png", &token()),
            "capture-0f8fad5b-d9cb-469f-a165-70867728950e.png"
        );
        assert_eq!(
            upload_file_name_with("Market Square.Final.WEBM", &token()),
            "market-squarefinal-0f8fad5b-d9cb-469f-a165-70867728950e.webm"
        );
    }

    #[test]
    fn test_name_without_extension() {
        assert_eq!(
            upload_file_name_with("snapshot", &token()),
            "snapshot-0f8fad5b-d9cb-469f-a165-70867728950e"
        );
    }

    #[test]
    fn test_random_names_differ() {
        assert_ne!(upload_file_name("a.png"), upload_file_name("a.png"));
    }
}
