use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating shop phone numbers
    /// Optional leading `+`, then digits with single spaces, dashes, or parentheses
    /// - Valid: "+62 812-3456-7890", "(021) 555 1234", "08123456789"
    /// - Invalid: "phone", "12", "+62--812", "0812 3456 7890 ext"
    pub static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?(?:\(\d{1,4}\)|\d)(?:[ -]?(?:\(\d{1,4}\)|\d)){5,19}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex_valid() {
        assert!(PHONE_REGEX.is_match("+62 812-3456-7890"));
        assert!(PHONE_REGEX.is_match("(021) 555 1234"));
        assert!(PHONE_REGEX.is_match("08123456789"));
        assert!(PHONE_REGEX.is_match("555-0100"));
    }

    #[test]
    fn test_phone_regex_invalid() {
        assert!(!PHONE_REGEX.is_match("phone"));
        assert!(!PHONE_REGEX.is_match("12"));
        assert!(!PHONE_REGEX.is_match("+62--812"));
        assert!(!PHONE_REGEX.is_match("0812 3456 7890 ext"));
        assert!(!PHONE_REGEX.is_match(""));
    }
}
