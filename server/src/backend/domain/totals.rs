//! Grand total aggregation over the production table subtotals.

use shared::{AggregateTotals, FormattedTotals, TotalsResponse};

use super::numeric::format_currency;

/// Subtotals of every derived table as of the last recalculation pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TableSubtotals {
    pub agricultural: f64,
    pub beef: f64,
    pub dairy: f64,
    pub diverse_crop: f64,
    pub historical: f64,
    pub herd: f64,
    pub assets: f64,
}

/// Category and grand totals. Historical, herd and asset subtotals are
/// reported with their tables and stay out of the grand total.
pub fn aggregate(subtotals: &TableSubtotals) -> AggregateTotals {
    let livestock_combined = subtotals.beef + subtotals.dairy;
    AggregateTotals {
        agricultural: subtotals.agricultural,
        livestock_beef: subtotals.beef,
        livestock_dairy: subtotals.dairy,
        diverse_crop: subtotals.diverse_crop,
        livestock_combined,
        grand: subtotals.agricultural + livestock_combined + subtotals.diverse_crop,
    }
}

pub fn format_totals(totals: &AggregateTotals) -> FormattedTotals {
    FormattedTotals {
        agricultural: format_currency(totals.agricultural),
        livestock_beef: format_currency(totals.livestock_beef),
        livestock_dairy: format_currency(totals.livestock_dairy),
        diverse_crop: format_currency(totals.diverse_crop),
        livestock_combined: format_currency(totals.livestock_combined),
        grand: format_currency(totals.grand),
    }
}

pub fn totals_response(totals: &AggregateTotals) -> TotalsResponse {
    TotalsResponse {
        totals: *totals,
        formatted: format_totals(totals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_identity() {
        let subtotals = TableSubtotals {
            agricultural: 98_000.0,
            beef: 62_531.74,
            dairy: 0.0,
            diverse_crop: 1_500.0,
            historical: 999_999.0,
            herd: 10.0,
            assets: 175_375.0,
        };

        let totals = aggregate(&subtotals);

        assert!((totals.livestock_combined - 62_531.74).abs() < 0.001);
        assert!((totals.grand - 162_031.74).abs() < 0.001);
        assert!(
            (totals.grand - (totals.agricultural + totals.livestock_combined + totals.diverse_crop)).abs()
                < 0.001
        );
    }

    #[test]
    fn test_empty_subtotals_aggregate_to_zero() {
        let totals = aggregate(&TableSubtotals::default());
        assert_eq!(totals, AggregateTotals::default());
        assert_eq!(format_totals(&totals).grand, "R$ 0,00");
    }
}
