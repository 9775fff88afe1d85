//! Recalculation orchestrator.
//!
//! A pass always runs in the same order and to completion:
//! 1. reconcile the price registry with the price rows
//! 2. recompute every row of every production table against the registry
//! 3. recompute every table subtotal
//! 4. aggregate the subtotals into category and grand totals
//!
//! Callers hold the workbook exclusively for the whole pass, so no partially
//! recomputed state is ever observable.

use log::debug;
use shared::{
    AgriculturalRowInput, AggregateTotals, AssetRowInput, BeefRowInput, DairyRowInput,
    DiverseCropRowInput, HerdRowInput, HistoricalRowInput, TableKind,
};

use super::price_registry::PriceRegistry;
use super::price_table::PriceTable;
use super::rows::Pricing;
use super::table::{Table, TableOps};
use super::totals::{aggregate, TableSubtotals};

/// Every table whose rows carry derived outputs
#[derive(Debug, Clone, Default)]
pub struct ProductionTables {
    pub agricultural: Table<AgriculturalRowInput>,
    pub beef: Table<BeefRowInput>,
    pub dairy: Table<DairyRowInput>,
    pub diverse_crop: Table<DiverseCropRowInput>,
    pub historical: Table<HistoricalRowInput>,
    pub herd: Table<HerdRowInput>,
    pub assets: Table<AssetRowInput>,
}

impl ProductionTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `kind`; `None` for the price table, which is kept apart
    pub fn table(&self, kind: TableKind) -> Option<&dyn TableOps> {
        match kind {
            TableKind::Prices => None,
            TableKind::Agricultural => Some(&self.agricultural),
            TableKind::Beef => Some(&self.beef),
            TableKind::Dairy => Some(&self.dairy),
            TableKind::DiverseCrop => Some(&self.diverse_crop),
            TableKind::Historical => Some(&self.historical),
            TableKind::Herd => Some(&self.herd),
            TableKind::Assets => Some(&self.assets),
        }
    }

    pub fn table_mut(&mut self, kind: TableKind) -> Option<&mut dyn TableOps> {
        match kind {
            TableKind::Prices => None,
            TableKind::Agricultural => Some(&mut self.agricultural),
            TableKind::Beef => Some(&mut self.beef),
            TableKind::Dairy => Some(&mut self.dairy),
            TableKind::DiverseCrop => Some(&mut self.diverse_crop),
            TableKind::Historical => Some(&mut self.historical),
            TableKind::Herd => Some(&mut self.herd),
            TableKind::Assets => Some(&mut self.assets),
        }
    }

    fn all_mut(&mut self) -> [&mut dyn TableOps; 7] {
        [
            &mut self.agricultural,
            &mut self.beef,
            &mut self.dairy,
            &mut self.diverse_crop,
            &mut self.historical,
            &mut self.herd,
            &mut self.assets,
        ]
    }

    pub fn subtotals(&self) -> TableSubtotals {
        TableSubtotals {
            agricultural: self.agricultural.subtotal(),
            beef: self.beef.subtotal(),
            dairy: self.dairy.subtotal(),
            diverse_crop: self.diverse_crop.subtotal(),
            historical: self.historical.subtotal(),
            herd: self.herd.subtotal(),
            assets: self.assets.subtotal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub totals: AggregateTotals,
    pub rows_recomputed: usize,
    /// Price rows refused because another row owns their key
    pub rejections: Vec<String>,
}

/// Run one full recalculation pass
pub fn run_full_pass(
    registry: &mut PriceRegistry,
    prices: &mut PriceTable,
    tables: &mut ProductionTables,
    dairy_key: &str,
) -> PassReport {
    let sync = prices.sync(registry);

    let pricing = Pricing::new(registry, dairy_key);
    let mut rows_recomputed = 0;
    for table in tables.all_mut() {
        rows_recomputed += table.recompute_rows(&pricing);
    }
    for table in tables.all_mut() {
        table.recompute_subtotal();
    }

    let totals = aggregate(&tables.subtotals());
    debug!(
        "Recalculation pass: {} rows, {} price keys, grand total {:.2}",
        rows_recomputed,
        registry.len(),
        totals.grand
    );

    PassReport {
        totals,
        rows_recomputed,
        rejections: sync.rejections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::rows::DEFAULT_DAIRY_PRICE_KEY;
    use shared::PriceRowInput;

    fn setup() -> (PriceRegistry, PriceTable, ProductionTables) {
        let mut registry = PriceRegistry::new();
        let mut prices = PriceTable::new();
        prices
            .add_row(
                &mut registry,
                PriceRowInput {
                    key: "MILHO".to_string(),
                    value: 63.0,
                    ..Default::default()
                },
            )
            .unwrap();

        let mut tables = ProductionTables::new();
        tables.agricultural.add_row(AgriculturalRowInput {
            period: "2025 / 2026".to_string(),
            activity_key: "MILHO".to_string(),
            area: 2.0,
            yield_per_area: 50.0,
            ..Default::default()
        });
        tables.dairy.add_row(DairyRowInput {
            period: "2025".to_string(),
            activity_label: "PECUÁRIA LEITEIRA".to_string(),
            liters_per_day: 18.0,
            cow_count: 20,
            ..Default::default()
        });
        (registry, prices, tables)
    }

    #[test]
    fn test_full_pass_computes_rows_subtotals_and_totals() {
        let (mut registry, mut prices, mut tables) = setup();

        let report = run_full_pass(&mut registry, &mut prices, &mut tables, DEFAULT_DAIRY_PRICE_KEY);

        assert_eq!(report.rows_recomputed, 2);
        assert_eq!(tables.agricultural.rows()[0].output.derived_value, 6300.0);
        assert_eq!(tables.dairy.rows()[0].output.derived_quantity, 10800.0);
        assert_eq!(tables.dairy.rows()[0].output.derived_value, 0.0);
        assert_eq!(report.totals.agricultural, 6300.0);
        assert_eq!(report.totals.grand, 6300.0);
    }

    #[test]
    fn test_full_pass_is_idempotent() {
        let (mut registry, mut prices, mut tables) = setup();

        let first = run_full_pass(&mut registry, &mut prices, &mut tables, DEFAULT_DAIRY_PRICE_KEY);
        let second = run_full_pass(&mut registry, &mut prices, &mut tables, DEFAULT_DAIRY_PRICE_KEY);

        assert_eq!(first, second);
    }

    #[test]
    fn test_table_routing_by_kind() {
        let mut tables = ProductionTables::new();
        assert!(tables.table(TableKind::Prices).is_none());
        assert_eq!(tables.table(TableKind::DiverseCrop).map(|t| t.kind()), Some(TableKind::DiverseCrop));
        assert_eq!(tables.table_mut(TableKind::Herd).map(|t| t.kind()), Some(TableKind::Herd));
    }
}
