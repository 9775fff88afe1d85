//! Table coordinator for production-style tables.
//!
//! A `Table<R>` owns an insertion-ordered list of rows addressed by `RowId`
//! and the subtotal of their derived values. `TableOps` erases the row type so
//! the workbook can route requests by `TableKind`.

use shared::{
    AgriculturalRowInput, AssetRowInput, BeefRowInput, DairyRowInput, DiverseCropRowInput,
    HerdRowInput, HistoricalRowInput, RowId, RowInput, RowOutput, RowView, TableKind, TableView,
    ValidationWarning,
};

use super::errors::LaudoError;
use super::numeric::{format_currency, format_decimal};
use super::rows::{Pricing, RowSpec};

/// Extract a concrete row from the tagged `RowInput` union
pub trait FromRowInput: Sized {
    fn from_row_input(input: RowInput) -> Option<Self>;
}

macro_rules! impl_from_row_input {
    ($($row:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromRowInput for $row {
                fn from_row_input(input: RowInput) -> Option<Self> {
                    match input {
                        RowInput::$variant(row) => Some(row),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_row_input!(
    AgriculturalRowInput => Agricultural,
    BeefRowInput => Beef,
    DairyRowInput => Dairy,
    DiverseCropRowInput => DiverseCrop,
    HistoricalRowInput => Historical,
    HerdRowInput => Herd,
    AssetRowInput => Assets,
);

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<R> {
    pub id: RowId,
    pub input: R,
    pub output: RowOutput,
}

#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: Vec<TableRow<R>>,
    subtotal: f64,
}

impl<R: RowSpec> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RowSpec> Table<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            subtotal: 0.0,
        }
    }

    /// Append a row; outputs stay zero until the next recalculation pass
    pub fn add_row(&mut self, mut input: R) -> (RowId, Vec<ValidationWarning>) {
        let warnings = input.normalize();
        let id = RowId::new();
        self.rows.push(TableRow {
            id,
            input,
            output: RowOutput::default(),
        });
        (id, warnings)
    }

    pub fn remove_row(&mut self, id: RowId) -> Result<TableRow<R>, LaudoError> {
        let position = self
            .rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(LaudoError::RowNotFound { kind: R::KIND, id })?;
        Ok(self.rows.remove(position))
    }

    pub fn row(&self, id: RowId) -> Option<&TableRow<R>> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn rows(&self) -> &[TableRow<R>] {
        &self.rows
    }

    /// Apply a raw field edit to the row's inputs. Outputs are left for the
    /// next recalculation pass.
    pub fn edit(&mut self, id: RowId, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(LaudoError::RowNotFound { kind: R::KIND, id })?;
        row.input.apply_edit(field, raw)
    }

    /// Recompute every row's outputs against the given prices
    pub fn recompute_rows(&mut self, pricing: &Pricing<'_>) -> usize {
        for row in &mut self.rows {
            row.output = row.input.compute(pricing);
        }
        self.rows.len()
    }

    pub fn recompute_subtotal(&mut self) -> f64 {
        self.subtotal = self.rows.iter().map(|row| row.output.derived_value).sum();
        self.subtotal
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn view(&self) -> TableView<R> {
        TableView {
            kind: R::KIND,
            rows: self
                .rows
                .iter()
                .map(|row| RowView {
                    id: row.id,
                    input: row.input.clone(),
                    output: row.output,
                    formatted_quantity: format_decimal(row.output.derived_quantity, R::QUANTITY_PLACES),
                    formatted_value: format_currency(row.output.derived_value),
                })
                .collect(),
            subtotal: self.subtotal,
            formatted_subtotal: format_currency(self.subtotal),
        }
    }
}

impl Table<HerdRowInput> {
    /// Total number of animals across all herd rows
    pub fn head_count(&self) -> u64 {
        self.rows.iter().map(|row| row.input.quantity as u64).sum()
    }
}

/// Type-erased table operations used when routing by `TableKind`
pub trait TableOps: Send {
    fn kind(&self) -> TableKind;
    fn add_input(&mut self, input: RowInput) -> Result<(RowId, Vec<ValidationWarning>), LaudoError>;
    fn remove(&mut self, id: RowId) -> Result<(), LaudoError>;
    fn edit_field(&mut self, id: RowId, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError>;
    fn contains(&self, id: RowId) -> bool;
    fn recompute_rows(&mut self, pricing: &Pricing<'_>) -> usize;
    fn recompute_subtotal(&mut self) -> f64;
    fn subtotal(&self) -> f64;
    fn len(&self) -> usize;
}

impl<R: RowSpec + FromRowInput> TableOps for Table<R> {
    fn kind(&self) -> TableKind {
        R::KIND
    }

    fn add_input(&mut self, input: RowInput) -> Result<(RowId, Vec<ValidationWarning>), LaudoError> {
        let given = input.kind();
        let row = R::from_row_input(input).ok_or_else(|| LaudoError::InvalidRowInput {
            kind: R::KIND,
            reason: format!("expected a {} row, got {}", R::KIND, given),
        })?;
        Ok(self.add_row(row))
    }

    fn remove(&mut self, id: RowId) -> Result<(), LaudoError> {
        self.remove_row(id).map(|_| ())
    }

    fn edit_field(&mut self, id: RowId, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        self.edit(id, field, raw)
    }

    fn contains(&self, id: RowId) -> bool {
        self.row(id).is_some()
    }

    fn recompute_rows(&mut self, pricing: &Pricing<'_>) -> usize {
        Table::recompute_rows(self, pricing)
    }

    fn recompute_subtotal(&mut self) -> f64 {
        Table::recompute_subtotal(self)
    }

    fn subtotal(&self) -> f64 {
        Table::subtotal(self)
    }

    fn len(&self) -> usize {
        Table::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::price_registry::PriceRegistry;
    use crate::backend::domain::rows::DEFAULT_DAIRY_PRICE_KEY;

    fn coffee_row(area: f64, yield_per_area: f64) -> HistoricalRowInput {
        HistoricalRowInput {
            period: "2024 / 2025".to_string(),
            activity_key: "CAFÉ ARÁBICA".to_string(),
            area,
            yield_per_area,
            ..Default::default()
        }
    }

    #[test]
    fn test_subtotal_sums_derived_values() {
        let mut registry = PriceRegistry::new();
        registry.set(RowId::new(), "CAFÉ ARÁBICA", 1755.0).unwrap();
        let pricing = Pricing::new(&registry, DEFAULT_DAIRY_PRICE_KEY);

        let mut table = Table::new();
        table.add_row(coffee_row(1.31, 29.0));
        table.add_row(coffee_row(1.31, 32.0));
        table.recompute_rows(&pricing);
        let subtotal = table.recompute_subtotal();

        let rows = table.rows();
        assert!((rows[0].output.derived_quantity - 37.99).abs() < 0.001);
        assert!((rows[0].output.derived_value - 66672.45).abs() < 0.001);
        assert!((rows[1].output.derived_quantity - 41.92).abs() < 0.001);
        assert!((rows[1].output.derived_value - 73569.60).abs() < 0.001);
        assert!((subtotal - 140242.05).abs() < 0.001);
    }

    #[test]
    fn test_agricultural_coffee_subtotal() {
        let mut registry = PriceRegistry::new();
        registry.set(RowId::new(), "CAFÉ ARÁBICA", 1755.0).unwrap();
        let pricing = Pricing::new(&registry, DEFAULT_DAIRY_PRICE_KEY);

        let mut table: Table<AgriculturalRowInput> = Table::new();
        for yield_per_area in [29.0, 32.0] {
            table.add_row(AgriculturalRowInput {
                period: "2025 / 2026".to_string(),
                activity_key: "café arábica".to_string(),
                area: 1.31,
                yield_per_area,
                ..Default::default()
            });
        }
        table.recompute_rows(&pricing);

        assert!((table.rows()[0].output.derived_value - 66672.45).abs() < 0.001);
        assert!((table.rows()[1].output.derived_value - 73569.60).abs() < 0.001);
        assert!((table.recompute_subtotal() - 140242.05).abs() < 0.001);
        assert_eq!(table.view().formatted_subtotal, "R$ 140.242,05");
    }

    #[test]
    fn test_rows_keep_insertion_order_and_stable_ids() {
        let mut table: Table<HistoricalRowInput> = Table::new();
        let (first, _) = table.add_row(coffee_row(1.0, 1.0));
        let (second, _) = table.add_row(coffee_row(2.0, 1.0));
        let (third, _) = table.add_row(coffee_row(3.0, 1.0));

        table.remove_row(second).unwrap();

        let ids: Vec<RowId> = table.rows().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![first, third]);
    }

    #[test]
    fn test_remove_missing_row_fails() {
        let mut table: Table<DairyRowInput> = Table::new();
        let result = table.remove_row(RowId::new());
        assert!(matches!(result, Err(LaudoError::RowNotFound { kind: TableKind::Dairy, .. })));
    }

    #[test]
    fn test_add_input_rejects_other_variant() {
        let mut table: Table<BeefRowInput> = Table::new();
        let result = TableOps::add_input(&mut table, RowInput::empty(TableKind::Dairy));
        assert!(matches!(result, Err(LaudoError::InvalidRowInput { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn test_view_formats_outputs() {
        let mut registry = PriceRegistry::new();
        registry.set(RowId::new(), "MILHO", 63.0).unwrap();
        let pricing = Pricing::new(&registry, DEFAULT_DAIRY_PRICE_KEY);
        let mut table = Table::new();
        table.add_row(AgriculturalRowInput {
            activity_key: "milho".to_string(),
            area: 2.0,
            yield_per_area: 50.0,
            ..Default::default()
        });
        table.recompute_rows(&pricing);
        table.recompute_subtotal();

        let view = table.view();

        assert_eq!(view.kind, TableKind::Agricultural);
        assert_eq!(view.rows[0].input.activity_key, "MILHO");
        assert_eq!(view.rows[0].formatted_quantity, "100,00");
        assert_eq!(view.rows[0].formatted_value, "R$ 6.300,00");
        assert_eq!(view.formatted_subtotal, "R$ 6.300,00");
    }

    #[test]
    fn test_herd_head_count() {
        let mut table = Table::new();
        table.add_row(HerdRowInput {
            quantity: 4,
            ..Default::default()
        });
        table.add_row(HerdRowInput {
            quantity: 5,
            ..Default::default()
        });
        assert_eq!(table.head_count(), 9);
    }
}
