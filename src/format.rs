use chrono::NaiveDate;

/// Extract only the digits from a phone input.
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a phone number for display and for the spreadsheet column.
///
/// 11 digits render as `(00) 00000-0000`, 10 digits as `(00) 0000-0000`.
/// Anything else is returned trimmed and unchanged so the user can see
/// exactly what validation is complaining about.
pub fn format_phone(raw: &str) -> String {
    let digits = phone_digits(raw);

    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        _ => raw.trim().to_string(),
    }
}

/// Date serialization used in the payload sent to the spreadsheet (dd/MM/yy).
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// Date rendering used on screen (dd/MM/yyyy).
pub fn format_date_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_eleven_digit_phone() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
    }

    #[test]
    fn formats_ten_digit_phone() {
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
    }

    #[test]
    fn reformats_partially_masked_input() {
        assert_eq!(format_phone("(11) 98765 4321"), "(11) 98765-4321");
    }

    #[test]
    fn leaves_unrecognized_input_alone() {
        assert_eq!(format_phone("  12345  "), "12345");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn short_date_uses_two_digit_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date_short(date), "07/03/24");
    }

    #[test]
    fn display_date_uses_full_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date_display(date), "07/03/2024");
    }
}
