//! Fixed-point amount conversions between on-chain integer units and the
//! 4-decimal display strings the UI renders.
//!
//! The render path never fails: a malformed or out-of-range amount formats to
//! `"0"` so a transient bad read cannot take down the whole view. Parsing is
//! strict (`None` on garbage) and always rounds down to the integer unit.

use alloy::primitives::U256;
use std::time::Duration;

/// Decimals of the native currency and of CCIP-BnM.
pub const NATIVE_DECIMALS: u32 = 18;

/// Displayed fractional digits.
const DISPLAY_DECIMALS: u32 = 4;

/// Format a raw integer amount as a fixed 4-decimal string.
pub fn format_units(raw: U256, decimals: u32) -> String {
    let Some(divisor) = U256::from(10u64).checked_pow(U256::from(decimals)) else {
        return "0".to_string();
    };
    if divisor.is_zero() {
        return "0".to_string();
    }
    let whole = raw / divisor;
    let remainder = raw % divisor;

    // Scale the remainder to exactly DISPLAY_DECIMALS digits, truncating.
    let frac = if decimals >= DISPLAY_DECIMALS {
        let down = U256::from(10u64).pow(U256::from(decimals - DISPLAY_DECIMALS));
        remainder / down
    } else {
        let up = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS - decimals));
        remainder * up
    };

    format!("{whole}.{frac:0>4}")
}

/// 18-decimal shorthand for native amounts (wei → ether display).
pub fn format_eth(wei: U256) -> String {
    format_units(wei, NATIVE_DECIMALS)
}

/// Parse a decimal string into integer units, multiplying by `10^decimals`
/// and rounding down. Returns `None` for malformed or negative input.
pub fn parse_units(text: &str, decimals: u32) -> Option<U256> {
    let text = text.trim();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let scale = U256::from(10u64).checked_pow(U256::from(decimals))?;
    let whole_part = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).ok()?
    };
    let mut value = whole_part.checked_mul(scale)?;

    // Digits beyond the unit's precision are dropped (round down).
    let frac = &frac[..frac.len().min(decimals as usize)];
    if !frac.is_empty() {
        let frac_part = U256::from_str_radix(frac, 10).ok()?;
        let up = U256::from(10u64).pow(U256::from(decimals - frac.len() as u32));
        value = value.checked_add(frac_part.checked_mul(up)?)?;
    }
    Some(value)
}

/// 18-decimal shorthand for native amounts (ether text → wei).
pub fn parse_eth(text: &str) -> Option<U256> {
    parse_units(text, NATIVE_DECIMALS)
}

/// Short "time since last update" text: `"42s ago"`, `"3m ago"`, `"2h ago"`.
pub fn format_time_since(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    format!("{}h ago", minutes / 60)
}

/// Countdown text for a remaining-time display, from milliseconds.
pub fn countdown_text(remaining_ms: i64) -> String {
    if remaining_ms <= 0 {
        return "Ended".to_string();
    }
    let seconds = remaining_ms / 1000;
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_truncates_to_four_decimals() {
        // 1.23456789 ETH in wei
        let wei = parse_eth("1.23456789").unwrap();
        assert_eq!(format_eth(wei), "1.2345");
        assert_eq!(format_eth(U256::ZERO), "0.0000");
        assert_eq!(format_units(U256::from(1_234_500u64), 6), "1.2345");
    }

    #[test]
    fn test_format_low_decimal_tokens() {
        // 2 units of a 2-decimal token
        assert_eq!(format_units(U256::from(200u64), 2), "2.0000");
        assert_eq!(format_units(U256::from(201u64), 2), "2.0100");
    }

    #[test]
    fn test_parse_rounds_down() {
        // sub-unit digits beyond the precision are dropped
        assert_eq!(parse_units("1.2345678", 6), Some(U256::from(1_234_567u64)));
        assert_eq!(parse_units("0.0001", 2), Some(U256::ZERO));
        assert_eq!(
            parse_eth("0.001"),
            Some(U256::from(1_000_000_000_000_000u64))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_eth(""), None);
        assert_eq!(parse_eth("."), None);
        assert_eq!(parse_eth("abc"), None);
        assert_eq!(parse_eth("-1"), None);
        assert_eq!(parse_eth("1.2.3"), None);
        assert_eq!(parse_eth("1e18"), None);
    }

    #[test]
    fn test_round_trip_stability() {
        // parse(format(parse(a))) == parse(a) for 4-decimal inputs
        for a in ["0.0100", "1.2345", "42.0000", "0.0001", "1000.9999"] {
            let once = parse_eth(a).unwrap();
            let twice = parse_eth(&format_eth(once)).unwrap();
            assert_eq!(once, twice, "round trip drifted for {a}");
        }
    }

    #[test]
    fn test_time_since() {
        assert_eq!(format_time_since(Duration::from_secs(42)), "42s ago");
        assert_eq!(format_time_since(Duration::from_secs(180)), "3m ago");
        assert_eq!(format_time_since(Duration::from_secs(7_200)), "2h ago");
    }

    #[test]
    fn test_countdown_text() {
        assert_eq!(countdown_text(0), "Ended");
        assert_eq!(countdown_text(-5), "Ended");
        assert_eq!(countdown_text(45_000), "45s");
        assert_eq!(countdown_text(12 * 60_000), "12m");
        assert_eq!(countdown_text((4 * 3_600 + 12 * 60) * 1000), "4h 12m");
        assert_eq!(countdown_text((2 * 86_400 + 4 * 3_600) * 1000), "2d 4h");
    }
}
