pub const COUNTRY_CODE: &str = "91";
pub const PHONE_LENGTH: usize = 12;

/// Accepts `91` followed by exactly ten digits. Input is not normalized;
/// `+`, spaces and dashes must be stripped by the caller.
pub fn validate_phone_number(phone: &str) -> bool {
    phone.len() == PHONE_LENGTH
        && phone.starts_with(COUNTRY_CODE)
        && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_country_prefixed_numbers() {
        assert!(validate_phone_number("919876543210"));
        assert!(validate_phone_number("910000000000"));
    }

    #[test]
    fn rejects_everything_else() {
        for phone in [
            "",
            "9876543210",
            "91987654321",
            "9198765432100",
            "+919876543210",
            "91 9876543210",
            "91-987654321",
            "929876543210",
            "91987654321a",
            "९१९८७६५४३२१०",
        ] {
            assert!(!validate_phone_number(phone), "{phone} should be rejected");
        }
    }
}
