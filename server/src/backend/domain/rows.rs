//! Row controllers: field editing and derived computation for each table variant.
//!
//! ## Key Responsibilities
//! - **Field edits**: apply a raw, user-typed value to a named field. Numbers
//!   go through the locale normalizer, keys are upper-cased, periods are
//!   checked against their enumerated set. Malformed input never fails; it is
//!   stored as `0` and reported as a `ValidationWarning`.
//! - **Computation**: `compute` derives `{derived_quantity, derived_value}`
//!   from the row's own fields and a `Pricing` view of the registry. It is a
//!   pure function, so a full pass can always rebuild every output.
//!
//! Unknown field names are the only hard error (`LaudoError::UnknownField`).

use shared::{
    AgriculturalRowInput, AssetRowInput, BeefRowInput, DairyRowInput, DiverseCropRowInput,
    HerdRowInput, HerdSex, HistoricalRowInput, PriceRowInput, RowOutput, TableKind,
    ValidationWarning,
};

use super::errors::LaudoError;
use super::numeric::{truncate_whole, try_parse_locale_decimal};
use super::price_registry::{normalize_key, PriceRegistry};
use super::validation::{check_period, PeriodSet};

/// Days per month used to turn daily milk yield into monthly production
pub const DAIRY_DAYS_PER_MONTH: f64 = 30.0;

/// Default registry key used to price every dairy row
pub const DEFAULT_DAIRY_PRICE_KEY: &str = "PECUÁRIA LEITEIRA";

/// Read-only view of the prices used during one computation
#[derive(Debug, Clone, Copy)]
pub struct Pricing<'a> {
    pub registry: &'a PriceRegistry,
    /// Key used for dairy rows regardless of their label
    pub dairy_key: &'a str,
}

impl<'a> Pricing<'a> {
    pub fn new(registry: &'a PriceRegistry, dairy_key: &'a str) -> Self {
        Self { registry, dairy_key }
    }

    pub fn price_of(&self, key: &str) -> f64 {
        self.registry.get(key)
    }
}

/// A row whose fields can be edited from raw user input
pub trait EditableRow: Clone + Send + 'static {
    const KIND: TableKind;

    /// Apply one raw field edit
    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError>;

    /// Normalize a freshly supplied row (seeded or added with initial data)
    fn normalize(&mut self) -> Vec<ValidationWarning>;
}

/// A production-style row with derived outputs
pub trait RowSpec: EditableRow {
    /// Decimal places used when displaying `derived_quantity`
    const QUANTITY_PLACES: usize = 2;

    fn compute(&self, pricing: &Pricing<'_>) -> RowOutput;
}

fn unknown_field(kind: TableKind, field: &str) -> LaudoError {
    LaudoError::UnknownField {
        kind,
        field: field.to_string(),
    }
}

fn priced(quantity: f64, unit_price: f64) -> RowOutput {
    let derived_quantity = if quantity.is_finite() { quantity } else { 0.0 };
    let derived_value = derived_quantity * unit_price;
    RowOutput {
        derived_quantity,
        derived_value: if derived_value.is_finite() { derived_value } else { 0.0 },
    }
}

fn edit_decimal(target: &mut f64, field: &str, raw: &str) -> Option<ValidationWarning> {
    match try_parse_locale_decimal(raw) {
        Some(value) if value < 0.0 => {
            *target = 0.0;
            Some(ValidationWarning::new(field, "Valor negativo ajustado para 0."))
        }
        Some(value) => {
            *target = value;
            None
        }
        None => {
            *target = 0.0;
            if raw.trim().is_empty() {
                None
            } else {
                Some(ValidationWarning::new(
                    field,
                    format!("Valor '{}' não é um número válido; considerado 0.", raw.trim()),
                ))
            }
        }
    }
}

fn edit_count(target: &mut u32, field: &str, raw: &str) -> Option<ValidationWarning> {
    let mut value = 0.0;
    let warning = edit_decimal(&mut value, field, raw);
    *target = truncate_whole(value);
    warning
}

fn edit_period(target: &mut String, field: &str, raw: &str, set: PeriodSet) -> Option<ValidationWarning> {
    *target = raw.trim().to_string();
    check_period(field, target, set)
}

fn clamp_non_negative(value: &mut f64, field: &str, warnings: &mut Vec<ValidationWarning>) {
    if !value.is_finite() || *value < 0.0 {
        *value = 0.0;
        warnings.push(ValidationWarning::new(field, "Valor inválido ajustado para 0."));
    }
}

fn parse_sex(raw: &str) -> Option<HerdSex> {
    match raw.trim().to_lowercase().as_str() {
        "" => Some(HerdSex::Unspecified),
        "m" | "macho" | "male" => Some(HerdSex::Male),
        "f" | "fêmea" | "femea" | "female" => Some(HerdSex::Female),
        _ => None,
    }
}

impl EditableRow for PriceRowInput {
    const KIND: TableKind = TableKind::Prices;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "key" => {
                self.key = normalize_key(raw);
                None
            }
            "quote_date" => {
                self.quote_date = raw.trim().to_string();
                None
            }
            "source" => {
                self.source = raw.trim().to_uppercase();
                None
            }
            "state" => {
                self.state = raw.trim().to_uppercase();
                None
            }
            "municipality" => {
                self.municipality = raw.trim().to_string();
                None
            }
            "value" => edit_decimal(&mut self.value, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        self.key = normalize_key(&self.key);
        self.source = self.source.trim().to_uppercase();
        self.state = self.state.trim().to_uppercase();
        clamp_non_negative(&mut self.value, "value", &mut warnings);
        warnings
    }
}

impl EditableRow for AgriculturalRowInput {
    const KIND: TableKind = TableKind::Agricultural;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "period" => edit_period(&mut self.period, field, raw, PeriodSet::Season),
            "activity_key" => {
                self.activity_key = normalize_key(raw);
                None
            }
            "unit" => {
                self.unit = raw.trim().to_string();
                None
            }
            "area" => edit_decimal(&mut self.area, field, raw),
            "yield_per_area" => edit_decimal(&mut self.yield_per_area, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        self.activity_key = normalize_key(&self.activity_key);
        warnings.extend(check_period("period", &self.period, PeriodSet::Season));
        clamp_non_negative(&mut self.area, "area", &mut warnings);
        clamp_non_negative(&mut self.yield_per_area, "yield_per_area", &mut warnings);
        warnings
    }
}

impl RowSpec for AgriculturalRowInput {
    fn compute(&self, pricing: &Pricing<'_>) -> RowOutput {
        priced(self.area * self.yield_per_area, pricing.price_of(&self.activity_key))
    }
}

impl EditableRow for BeefRowInput {
    const KIND: TableKind = TableKind::Beef;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "period" => edit_period(&mut self.period, field, raw, PeriodSet::CivilYear),
            "activity_key" => {
                self.activity_key = normalize_key(raw);
                None
            }
            "unit" => {
                self.unit = raw.trim().to_string();
                None
            }
            "animal_units_per_ha" => edit_decimal(&mut self.animal_units_per_ha, field, raw),
            "usable_area" => edit_decimal(&mut self.usable_area, field, raw),
            "head_count" => edit_decimal(&mut self.head_count, field, raw),
            "unit_weight" => edit_decimal(&mut self.unit_weight, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        self.activity_key = normalize_key(&self.activity_key);
        warnings.extend(check_period("period", &self.period, PeriodSet::CivilYear));
        clamp_non_negative(&mut self.animal_units_per_ha, "animal_units_per_ha", &mut warnings);
        clamp_non_negative(&mut self.usable_area, "usable_area", &mut warnings);
        clamp_non_negative(&mut self.head_count, "head_count", &mut warnings);
        clamp_non_negative(&mut self.unit_weight, "unit_weight", &mut warnings);
        warnings
    }
}

impl RowSpec for BeefRowInput {
    fn compute(&self, pricing: &Pricing<'_>) -> RowOutput {
        priced(self.head_count * self.unit_weight, pricing.price_of(&self.activity_key))
    }
}

impl EditableRow for DairyRowInput {
    const KIND: TableKind = TableKind::Dairy;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "period" => edit_period(&mut self.period, field, raw, PeriodSet::CivilYear),
            "activity_label" => {
                self.activity_label = raw.trim().to_uppercase();
                None
            }
            "liters_per_day" => edit_decimal(&mut self.liters_per_day, field, raw),
            "usable_area" => edit_decimal(&mut self.usable_area, field, raw),
            "cow_count" => edit_count(&mut self.cow_count, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        self.activity_label = self.activity_label.trim().to_uppercase();
        warnings.extend(check_period("period", &self.period, PeriodSet::CivilYear));
        clamp_non_negative(&mut self.liters_per_day, "liters_per_day", &mut warnings);
        clamp_non_negative(&mut self.usable_area, "usable_area", &mut warnings);
        warnings
    }
}

impl RowSpec for DairyRowInput {
    fn compute(&self, pricing: &Pricing<'_>) -> RowOutput {
        let monthly_liters = self.liters_per_day * self.cow_count as f64 * DAIRY_DAYS_PER_MONTH;
        priced(monthly_liters, pricing.price_of(pricing.dairy_key))
    }
}

impl EditableRow for DiverseCropRowInput {
    const KIND: TableKind = TableKind::DiverseCrop;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "period" => edit_period(&mut self.period, field, raw, PeriodSet::CivilYear),
            "activity_key" => {
                self.activity_key = normalize_key(raw);
                None
            }
            "activity_type" => {
                self.activity_type = raw.trim().to_string();
                None
            }
            "unit" => {
                self.unit = raw.trim().to_string();
                None
            }
            "whole_count" => edit_count(&mut self.whole_count, field, raw),
            "yield_per_unit" => edit_decimal(&mut self.yield_per_unit, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        self.activity_key = normalize_key(&self.activity_key);
        warnings.extend(check_period("period", &self.period, PeriodSet::CivilYear));
        clamp_non_negative(&mut self.yield_per_unit, "yield_per_unit", &mut warnings);
        warnings
    }
}

impl RowSpec for DiverseCropRowInput {
    fn compute(&self, pricing: &Pricing<'_>) -> RowOutput {
        priced(
            self.whole_count as f64 * self.yield_per_unit,
            pricing.price_of(&self.activity_key),
        )
    }
}

impl EditableRow for HistoricalRowInput {
    const KIND: TableKind = TableKind::Historical;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "period" => edit_period(&mut self.period, field, raw, PeriodSet::Season),
            "activity_key" => {
                self.activity_key = normalize_key(raw);
                None
            }
            "area" => edit_decimal(&mut self.area, field, raw),
            "yield_per_area" => edit_decimal(&mut self.yield_per_area, field, raw),
            "recorded_quantity" => edit_decimal(&mut self.recorded_quantity, field, raw),
            "recorded_value" => edit_decimal(&mut self.recorded_value, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        self.activity_key = normalize_key(&self.activity_key);
        warnings.extend(check_period("period", &self.period, PeriodSet::Season));
        clamp_non_negative(&mut self.area, "area", &mut warnings);
        clamp_non_negative(&mut self.yield_per_area, "yield_per_area", &mut warnings);
        warnings
    }
}

impl RowSpec for HistoricalRowInput {
    fn compute(&self, pricing: &Pricing<'_>) -> RowOutput {
        priced(self.area * self.yield_per_area, pricing.price_of(&self.activity_key))
    }
}

impl EditableRow for HerdRowInput {
    const KIND: TableKind = TableKind::Herd;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "age_band" => {
                self.age_band = raw.trim().to_string();
                None
            }
            "sex" => match parse_sex(raw) {
                Some(sex) => {
                    self.sex = sex;
                    None
                }
                None => {
                    self.sex = HerdSex::Unspecified;
                    Some(ValidationWarning::new(field, "Use Macho ou Fêmea."))
                }
            },
            "quantity" => edit_count(&mut self.quantity, field, raw),
            "unit_value" => edit_decimal(&mut self.unit_value, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        clamp_non_negative(&mut self.unit_value, "unit_value", &mut warnings);
        warnings
    }
}

impl RowSpec for HerdRowInput {
    const QUANTITY_PLACES: usize = 0;

    fn compute(&self, _pricing: &Pricing<'_>) -> RowOutput {
        priced(self.quantity as f64, self.unit_value)
    }
}

impl EditableRow for AssetRowInput {
    const KIND: TableKind = TableKind::Assets;

    fn apply_edit(&mut self, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        let warning = match field {
            "description" => {
                self.description = raw.trim().to_uppercase();
                None
            }
            "model" => {
                self.model = raw.trim().to_uppercase();
                None
            }
            "year" => {
                self.year = raw.trim().to_string();
                None
            }
            "color" => {
                self.color = raw.trim().to_uppercase();
                None
            }
            "value" => edit_decimal(&mut self.value, field, raw),
            _ => return Err(unknown_field(Self::KIND, field)),
        };
        Ok(warning)
    }

    fn normalize(&mut self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        clamp_non_negative(&mut self.value, "value", &mut warnings);
        warnings
    }
}

impl RowSpec for AssetRowInput {
    const QUANTITY_PLACES: usize = 0;

    fn compute(&self, _pricing: &Pricing<'_>) -> RowOutput {
        priced(1.0, self.value)
    }
}
