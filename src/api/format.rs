use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Badge colour for a lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Blue,
    Yellow,
    Red,
    Gray,
}

impl BadgeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Blue => "blue",
            BadgeColor::Yellow => "yellow",
            BadgeColor::Red => "red",
            BadgeColor::Gray => "gray",
        }
    }

    /// ANSI SGR foreground code for terminal output
    pub fn ansi_code(&self) -> u8 {
        match self {
            BadgeColor::Green => 32,
            BadgeColor::Blue => 34,
            BadgeColor::Yellow => 33,
            BadgeColor::Red => 31,
            BadgeColor::Gray => 90,
        }
    }
}

/// Map a workspace/solution/datasource/execution status to a badge colour.
/// Matching ignores case, spaces, dashes and underscores.
pub fn status_badge(status: &str) -> BadgeColor {
    let normalized: String = status
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect();

    match normalized.as_str() {
        "active" | "ready" | "completed" | "succeeded" | "success" | "deployed" | "connected" => BadgeColor::Green,
        "draft" | "new" | "created" => BadgeColor::Blue,
        "pending" | "inprogress" | "running" | "provisioning" | "generating" | "updating" => BadgeColor::Yellow,
        "failed" | "error" | "deleted" | "disconnected" | "cancelled" => BadgeColor::Red,
        _ => BadgeColor::Gray,
    }
}

/// Human relative time ("3 minutes ago"). Dates older than 30 days, and
/// anything in the future, print as a calendar date.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let seconds = elapsed.num_seconds();

    if seconds < 0 {
        return then.format("%Y-%m-%d").to_string();
    }

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    match seconds {
        0..=59 => "just now".to_string(),
        60..=3_599 => plural(elapsed.num_minutes(), "minute"),
        3_600..=86_399 => plural(elapsed.num_hours(), "hour"),
        _ if elapsed.num_days() <= 30 => plural(elapsed.num_days(), "day"),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}

/// `relative_time` for optional timestamps, with a dash for missing ones
pub fn relative_time_opt(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    then.map(|t| relative_time(t, now))
        .unwrap_or_else(|| "-".to_string())
}

/// Two-decimal amount with currency code, e.g. `USD 1,234.50`
pub fn format_cost(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{} {}.{}", if negative { "-" } else { "" }, currency, grouped, fraction)
}
