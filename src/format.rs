// Whole-dollar currency formatting for tables, charts and the info line

/// `92602.0` -> `$92,602`, `-50.0` -> `-$50`
pub fn usd(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

/// Signed delta: `+$5,729`, `-$50`, `$0`
pub fn signed_usd(amount: f64) -> String {
    let rounded = amount.round();
    if rounded > 0.0 {
        format!("+{}", usd(rounded))
    } else if rounded < 0.0 {
        usd(rounded)
    } else {
        "$0".to_string()
    }
}

/// Short chart label: `$92.6k`, `$390k`, `$1.2M`
pub fn compact_usd(amount: f64) -> String {
    let abs = amount.abs();
    let sign = if amount < 0.0 { "-" } else { "" };

    if abs >= 1_000_000.0 {
        format!("{}${}M", sign, three_significant(abs / 1_000_000.0))
    } else if abs >= 1_000.0 {
        format!("{}${}k", sign, three_significant(abs / 1_000.0))
    } else {
        format!("{}${}", sign, abs.round() as u64)
    }
}

fn three_significant(value: f64) -> String {
    if value >= 100.0 {
        format!("{:.0}", value)
    } else if value >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
