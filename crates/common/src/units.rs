//! Ether unit conversions: `wei` <-> decimal-string `ether` (18 decimals),
//! and the generic `parse_units`/`format_units` they're built on.

use alloy_primitives::U256;
use anyhow::{anyhow, Result};

const WEI_PER_ETHER: u32 = 18;

/// Parses a decimal string (e.g. `"1.5"`, `"0.000000000000000001"`) into wei,
/// scaling by 10^18. Rejects more than 18 fractional digits rather than
/// silently truncating precision.
pub fn parse_ether(value: &str) -> Result<U256> {
    parse_units(value, WEI_PER_ETHER)
}

/// Formats a wei amount as a decimal ether string with trailing zeros and any
/// trailing decimal point stripped (`1_000000000000000000` -> `"1"`).
pub fn format_ether(wei: U256) -> String {
    format_units(wei, WEI_PER_ETHER)
}

/// Parses a decimal string into an integer scaled by `10^decimals`.
pub fn parse_units(value: &str, decimals: u32) -> Result<U256> {
    let value = value.trim();
    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if frac_part.len() > decimals as usize {
        return Err(anyhow!(
            "value {value:?} has more than {decimals} fractional digits"
        ));
    }
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_val = U256::from_str_radix(int_part, 10)
        .map_err(|_| anyhow!("invalid integer part in {value:?}"))?;

    let mut padded_frac = frac_part.to_string();
    padded_frac.push_str(&"0".repeat(decimals as usize - frac_part.len()));
    let frac_val = if padded_frac.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded_frac, 10)
            .map_err(|_| anyhow!("invalid fractional part in {value:?}"))?
    };

    Ok(int_val * scale + frac_val)
}

/// Formats an integer scaled by `10^decimals` back into a decimal string.
pub fn format_units(value: U256, decimals: u32) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_part = value / scale;
    let frac_part = value % scale;
    if frac_part.is_zero() {
        return int_part.to_string();
    }
    let frac_str = format!("{frac_part:0width$}", width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{int_part}.{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ether_whole_number() {
        assert_eq!(parse_ether("1").unwrap(), U256::from(10u64).pow(U256::from(18u64)));
    }

    #[test]
    fn parse_ether_fraction() {
        let wei = parse_ether("1.5").unwrap();
        assert_eq!(wei, U256::from(1_500_000_000_000_000_000u64));
    }

    #[test]
    fn parse_ether_rejects_too_many_fractional_digits() {
        assert!(parse_ether("1.0000000000000000001").is_err());
    }

    #[test]
    fn format_ether_strips_trailing_zeros() {
        assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(format_ether(U256::from(10u64).pow(U256::from(18u64))), "1");
    }

    #[test]
    fn ether_round_trips_for_arbitrary_decimals() {
        for s in ["0.1", "3.14", "1000.000000000000000001", "0"] {
            let wei = parse_ether(s).unwrap();
            let back = format_ether(wei);
            assert_eq!(parse_ether(&back).unwrap(), wei);
        }
    }
}
