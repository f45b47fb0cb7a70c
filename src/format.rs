/// Formats an amount in the display currency. No conversion happens here,
/// only symbol placement and digit grouping.
pub fn format_currency(value: f64, currency: &str) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    match currency {
        "INR" => format!("{sign}₹{}", format_indian(abs)),
        "USD" | "CAD" | "AUD" | "HKD" | "SGD" => format!("{sign}${}", format_with_commas(abs)),
        "EUR" => format!("{sign}{} €", format_with_commas(abs)),
        "GBP" => format!("{sign}£{}", format_with_commas(abs)),
        _ => format!("{sign}{} {currency}", format_with_commas(abs)),
    }
}

pub fn format_percent(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

/// Splits a non-negative amount into its integer digits and two decimals.
fn split_amount(value: f64) -> (String, String) {
    let formatted = format!("{value:.2}");
    match formatted.split_once('.') {
        Some((integer, decimal)) => (integer.to_string(), decimal.to_string()),
        None => (formatted, "00".to_string()),
    }
}

fn group_digits(digits: &str, size: usize) -> Vec<String> {
    digits
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(size)
        .map(|chunk| chunk.iter().rev().collect::<String>())
        .rev()
        .collect()
}

pub fn format_with_commas(value: f64) -> String {
    let (integer, decimal) = split_amount(value);
    format!("{}.{decimal}", group_digits(&integer, 3).join(","))
}

/// Lakh/crore grouping: the last three digits, then groups of two.
pub fn format_indian(value: f64) -> String {
    let (integer, decimal) = split_amount(value);
    if integer.len() <= 3 {
        return format!("{integer}.{decimal}");
    }
    let (head, tail) = integer.split_at(integer.len() - 3);
    let mut groups = group_digits(head, 2);
    groups.push(tail.to_string());
    format!("{}.{decimal}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(0.0), "0.00");
        assert_eq!(format_with_commas(999.5), "999.50");
        assert_eq!(format_with_commas(1234567.891), "1,234,567.89");
    }

    #[test]
    fn test_format_indian() {
        assert_eq!(format_indian(950.0), "950.00");
        assert_eq!(format_indian(1000.0), "1,000.00");
        assert_eq!(format_indian(123456.0), "1,23,456.00");
        assert_eq!(format_indian(12345678.9), "1,23,45,678.90");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(2200.0, "INR"), "₹2,200.00");
        assert_eq!(format_currency(-150.0, "INR"), "-₹150.00");
        assert_eq!(format_currency(1500.0, "USD"), "$1,500.00");
        assert_eq!(format_currency(10.0, "CHF"), "10.00 CHF");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(20.0), "+20.00%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(-3.333), "-3.33%");
    }
}
