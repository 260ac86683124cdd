/// Price with a `$` prefix: 4 decimals below 1.0 in magnitude, 2 decimals otherwise.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return String::from("N/A");
    }
    if price.abs() < 1.0 {
        format!("${:.4}", price)
    } else {
        format!("${:.2}", price)
    }
}

/// Bare number version of `format_price` (axis labels, prompts).
pub fn format_price_plain(price: f64) -> String {
    if price.abs() < 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.2}", price)
    }
}

/// Groups the integer part with commas, keeps up to two decimals. e.g. 1234567.891 -> "1,234,567.89"
pub fn format_volume(volume: f64) -> String {
    if !volume.is_finite() {
        return String::from("N/A");
    }
    let rounded = format!("{:.2}", volume.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if volume < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_precision_depends_on_magnitude() {
        assert_eq!(format_price(2650.456), "$2650.46");
        assert_eq!(format_price(0.123456), "$0.1235");
        assert_eq!(format_price(f64::NAN), "N/A");
    }

    #[test]
    fn volume_grouping() {
        assert_eq!(format_volume(1234567.891), "1,234,567.89");
        assert_eq!(format_volume(999.0), "999");
        assert_eq!(format_volume(1000.5), "1,000.5");
    }
}
