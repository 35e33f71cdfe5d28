//! Display formatting shared by the dashboard sections.

const FILE_SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size in 1024-based units: no decimals for bytes, one
/// decimal otherwise, capped at GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut exponent = 0;
    while exponent < FILE_SIZE_UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }

    if exponent == 0 {
        format!("{} {}", bytes, FILE_SIZE_UNITS[0])
    } else {
        let size = bytes as f64 / 1024f64.powi(exponent as i32);
        format!("{:.1} {}", size, FILE_SIZE_UNITS[exponent])
    }
}

/// Brazilian currency: `R$ 1.234,56`, negatives as `-R$ 42,10`.
pub fn format_brl(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}

/// Parse the RBT12 (last twelve months of gross revenue) field. Accepts a
/// decimal comma; rejects negatives and anything that is not a number.
pub fn parse_rbt12(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}
