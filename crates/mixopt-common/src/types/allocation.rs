//! Allocation reports - projected outcome of a budget split

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::curve::HillCurve;
use crate::CURRENCY_SCALE;

/// Spend and projected outcome for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAllocation {
    pub channel: String,
    /// Spend rounded to currency precision
    pub spend: Decimal,
    /// Fraction of total spend (0.0 - 1.0)
    pub share: f64,
    /// Scenario-weighted expected revenue
    pub expected_revenue: f64,
    /// expected_revenue / spend
    pub roas: f64,
    /// Revenue gained by the next unit of spend
    pub marginal_roas: f64,
}

/// Projected outcome of a complete allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub allocations: Vec<ChannelAllocation>,
    pub total_spend: Decimal,
    pub expected_revenue: f64,
    /// (revenue - spend) / spend
    pub expected_roi: f64,
}

/// One line of input to [`AllocationReport::build`]
#[derive(Debug, Clone, Copy)]
pub struct ReportEntry<'a> {
    pub channel: &'a str,
    pub curve: &'a HillCurve,
    pub spend: f64,
    /// Scenario-weighted response multiplier for the channel
    pub multiplier: f64,
}

impl AllocationReport {
    /// Project revenue for every entry and aggregate
    pub fn build(entries: &[ReportEntry<'_>]) -> Self {
        let total: f64 = entries.iter().map(|e| e.spend).sum();

        let allocations: Vec<ChannelAllocation> = entries
            .iter()
            .map(|e| {
                let revenue = e.curve.response(e.spend) * e.multiplier;
                ChannelAllocation {
                    channel: e.channel.to_string(),
                    spend: to_currency(e.spend),
                    share: if total > 0.0 { e.spend / total } else { 0.0 },
                    expected_revenue: revenue,
                    roas: if e.spend > 0.0 { revenue / e.spend } else { 0.0 },
                    marginal_roas: e.curve.marginal_response(e.spend) * e.multiplier,
                }
            })
            .collect();

        let expected_revenue: f64 = allocations.iter().map(|a| a.expected_revenue).sum();
        let expected_roi = if total > 0.0 {
            (expected_revenue - total) / total
        } else {
            0.0
        };

        Self {
            allocations,
            total_spend: to_currency(total),
            expected_revenue,
            expected_roi,
        }
    }

    /// Spend for a channel, if present
    pub fn spend_for(&self, channel: &str) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| a.channel == channel)
            .and_then(|a| a.spend.to_f64())
    }
}

/// Round an amount to currency precision
pub fn to_currency(amount: f64) -> Decimal {
    Decimal::from_f64(amount)
        .unwrap_or_default()
        .round_dp(CURRENCY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_totals() {
        let search = HillCurve::new(1000.0, 100.0, 1.0).unwrap();
        let social = HillCurve::new(500.0, 50.0, 1.0).unwrap();
        let report = AllocationReport::build(&[
            ReportEntry { channel: "search", curve: &search, spend: 100.0, multiplier: 1.0 },
            ReportEntry { channel: "social", curve: &social, spend: 50.0, multiplier: 1.0 },
        ]);

        assert_eq!(report.total_spend, dec!(150.00));
        assert!((report.expected_revenue - 750.0).abs() < 1e-9);
        assert!((report.expected_roi - 4.0).abs() < 1e-9);
        assert!((report.allocations[0].share - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.spend_for("social"), Some(50.0));
        assert_eq!(report.spend_for("tv"), None);
    }

    #[test]
    fn test_multiplier_scales_revenue() {
        let curve = HillCurve::new(1000.0, 100.0, 1.0).unwrap();
        let report = AllocationReport::build(&[ReportEntry {
            channel: "search",
            curve: &curve,
            spend: 100.0,
            multiplier: 0.5,
        }]);
        assert!((report.expected_revenue - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_currency_rounding() {
        assert_eq!(to_currency(12.3456), dec!(12.35));
    }
}
