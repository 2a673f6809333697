// src/utils.rs

/// Collapse every whitespace run to a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a comma-separated argument into trimmed, non-empty parts
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim every entry and drop the ones left empty
pub fn clean_entries<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Build \n\t APIs  "), "Build APIs");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("python, rust,,  "), vec!["python", "rust"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_clean_entries() {
        assert_eq!(clean_entries([" a ", "", "  ", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("cv.PDF"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("letter.txt"), Some("txt".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }
}
