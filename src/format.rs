// Currency strings for display
// $1,234.56/hr and $2,567,885 (annual = hourly × 2080)

use crate::model::HOURS_PER_YEAR;

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn dollars(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, frac) = match formatted.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match frac {
        Some(frac) => format!("{}${}.{}", sign, group_thousands(whole), frac),
        None => format!("{}${}", sign, group_thousands(whole)),
    }
}

pub fn format_hourly(hourly: f64) -> String {
    format!("{}/hr", dollars(hourly, 2))
}

pub fn format_annual(hourly: f64) -> String {
    dollars(hourly * HOURS_PER_YEAR, 0)
}

pub fn format_combined(hourly: f64) -> String {
    format!("{} ({}/yr)", format_hourly(hourly), format_annual(hourly))
}

/// "N/A" for a missing wage
pub fn format_optional_hourly(hourly: Option<f64>) -> String {
    hourly.map(format_hourly).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hourly() {
        assert_eq!(format_hourly(40.0), "$40.00/hr");
        assert_eq!(format_hourly(1234.567), "$1,234.57/hr");
        assert_eq!(format_hourly(0.0), "$0.00/hr");
    }

    #[test]
    fn test_format_annual() {
        assert_eq!(format_annual(40.0), "$83,200");
        assert_eq!(format_annual(1234.56), "$2,567,885");
        assert_eq!(format_annual(0.0), "$0");
    }

    #[test]
    fn test_format_combined() {
        assert_eq!(format_combined(50.0), "$50.00/hr ($104,000/yr)");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional_hourly(None), "N/A");
        assert_eq!(format_optional_hourly(Some(38.5)), "$38.50/hr");
    }

    #[test]
    fn test_negative_values_keep_sign() {
        assert_eq!(format_hourly(-1500.0), "-$1,500.00/hr");
    }
}
