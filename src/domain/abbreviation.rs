//! Version abbreviation helpers.

/// Split an abbreviation such as `NIV1984` into `("NIV", "1984")`.
///
/// Letters and digits are collected independently, so `ESV` yields an empty
/// number part and an empty input yields two empty strings.
pub fn split_abbreviation(abbreviation: &str) -> (String, String) {
    let letters = abbreviation.chars().filter(|c| c.is_alphabetic()).collect();
    let numbers = abbreviation.chars().filter(|c| c.is_ascii_digit()).collect();
    (letters, numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(s: &str) -> (String, String) {
        split_abbreviation(s)
    }

    #[test]
    fn test_split_abbreviation() {
        assert_eq!(split("NIV1984"), ("NIV".into(), "1984".into()));
        assert_eq!(split("KJV21"), ("KJV".into(), "21".into()));
        assert_eq!(split("ESV"), ("ESV".into(), "".into()));
        assert_eq!(split(""), ("".into(), "".into()));
    }

    #[test]
    fn test_split_ignores_punctuation() {
        assert_eq!(split("NASB-1995"), ("NASB".into(), "1995".into()));
    }
}
