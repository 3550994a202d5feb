// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/format.rs
// Version: 1.0.0
//
// This file provides utility functions for formatting mining figures in the
// CLI output: hashrates given in MH/s, efficiency, USD amounts, large market
// numbers and payback periods.
//
// Tree Location:
// - src/utils/format.rs (formatting utilities)
// - Depends on: std

/// Utility functions for formatting dashboard figures
pub struct FormatUtils;

impl FormatUtils {
    /// Format a hashrate given in MH/s (MH/s, GH/s, TH/s)
    pub fn format_hashrate(mh_per_sec: f64) -> String {
        if mh_per_sec >= 1_000_000.0 {
            format!("{:.2} TH/s", mh_per_sec / 1_000_000.0)
        } else if mh_per_sec >= 1_000.0 {
            format!("{:.2} GH/s", mh_per_sec / 1_000.0)
        } else {
            format!("{:.2} MH/s", mh_per_sec)
        }
    }

    pub fn format_efficiency(mh_per_watt: f64) -> String {
        format!("{:.3} MH/W", mh_per_watt)
    }

    /// Dollar amount with cents, sub-cent prices with four decimals
    pub fn format_usd(amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        let abs = amount.abs();
        if abs > 0.0 && abs < 0.01 {
            format!("{}${:.4}", sign, abs)
        } else {
            format!("{}${:.2}", sign, abs)
        }
    }

    /// Format large numbers with suffixes (K, M, B)
    pub fn format_number(num: f64) -> String {
        let abs = num.abs();
        if abs >= 1_000_000_000.0 {
            format!("{:.1}B", num / 1_000_000_000.0)
        } else if abs >= 1_000_000.0 {
            format!("{:.1}M", num / 1_000_000.0)
        } else if abs >= 1_000.0 {
            format!("{:.1}K", num / 1_000.0)
        } else {
            format!("{:.0}", num)
        }
    }

    /// Payback period; negative values mean the device never pays off
    pub fn format_roi(days: f64) -> String {
        if days < 0.0 {
            "never".to_string()
        } else {
            format!("{:.0} days", days.ceil())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashrate_units() {
        assert_eq!(FormatUtils::format_hashrate(125.5), "125.50 MH/s");
        assert_eq!(FormatUtils::format_hashrate(2_500.0), "2.50 GH/s");
        assert_eq!(FormatUtils::format_hashrate(3_000_000.0), "3.00 TH/s");
    }

    #[test]
    fn usd_amounts() {
        assert_eq!(FormatUtils::format_usd(24.18), "$24.18");
        assert_eq!(FormatUtils::format_usd(-0.72), "-$0.72");
        assert_eq!(FormatUtils::format_usd(0.0026), "$0.0026");
        assert_eq!(FormatUtils::format_usd(0.0), "$0.00");
    }

    #[test]
    fn numbers_and_roi() {
        assert_eq!(FormatUtils::format_number(3_400_000_000.0), "3.4B");
        assert_eq!(FormatUtils::format_number(380_000_000.0), "380.0M");
        assert_eq!(FormatUtils::format_number(950.0), "950");
        assert_eq!(FormatUtils::format_roi(-1.0), "never");
        assert_eq!(FormatUtils::format_roi(624.2), "625 days");
    }
}

// Changelog:
// - v1.0.0 (2026-10-19): Formatting helpers for the cmo CLI.
//   - Purpose: Consistent, human-readable output for profitability and
//     market figures.
//   - Features: Hashrate in MH/s to TH/s units, MH/W efficiency, USD with
//     sub-cent precision, K/M/B suffixes and ROI periods.
