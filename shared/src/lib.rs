use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a table row. Rows are addressed by id, never by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub Uuid);

impl RowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(RowId)
            .map_err(|e| format!("Invalid row id '{}': {}", s, e))
    }
}

/// The tables that make up an appraisal workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    Prices,
    Agricultural,
    Beef,
    Dairy,
    DiverseCrop,
    Historical,
    Herd,
    Assets,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Prices,
        TableKind::Agricultural,
        TableKind::Beef,
        TableKind::Dairy,
        TableKind::DiverseCrop,
        TableKind::Historical,
        TableKind::Herd,
        TableKind::Assets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Prices => "prices",
            TableKind::Agricultural => "agricultural",
            TableKind::Beef => "beef",
            TableKind::Dairy => "dairy",
            TableKind::DiverseCrop => "diverse-crop",
            TableKind::Historical => "historical",
            TableKind::Herd => "herd",
            TableKind::Assets => "assets",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown table '{}'", s))
    }
}

/// A commodity price quote ("preço do produto")
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceRowInput {
    /// Commodity / activity name; upper-cased on entry, used as the join key
    pub key: String,
    /// Quote date (YYYY-MM-DD)
    pub quote_date: String,
    /// Price source, e.g. CONAB
    pub source: String,
    /// State code (UF)
    pub state: String,
    pub municipality: String,
    /// Unit price
    pub value: f64,
}

/// Agricultural production: area × yield per area
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgriculturalRowInput {
    /// Season label, e.g. "2025 / 2026"
    pub period: String,
    pub activity_key: String,
    /// Yield unit (kg/ha, ton/ha, sacas/ha, caixas/ha)
    pub unit: String,
    /// Planted area in hectares
    pub area: f64,
    pub yield_per_area: f64,
}

/// Beef cattle production: head count × unit weight
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeefRowInput {
    /// Civil year, e.g. "2025"
    pub period: String,
    pub activity_key: String,
    /// Weight unit (@, KG, carcass)
    pub unit: String,
    pub animal_units_per_ha: f64,
    pub usable_area: f64,
    pub head_count: f64,
    pub unit_weight: f64,
}

/// Truncate a value to a whole, non-negative count
pub fn truncate_whole(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.trunc().min(u32::MAX as f64) as u32
}

/// Count fields accept any JSON number; fractions are truncated
fn deserialize_whole_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    f64::deserialize(deserializer).map(truncate_whole)
}

/// Dairy production: liters per day × lactating cows × 30 days
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DairyRowInput {
    pub period: String,
    /// Free-text label; pricing uses the configured dairy key instead
    pub activity_label: String,
    pub liters_per_day: f64,
    pub usable_area: f64,
    #[serde(deserialize_with = "deserialize_whole_count")]
    pub cow_count: u32,
}

/// Diverse-crop production: whole count × yield per unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiverseCropRowInput {
    pub period: String,
    pub activity_key: String,
    pub activity_type: String,
    pub unit: String,
    #[serde(deserialize_with = "deserialize_whole_count")]
    pub whole_count: u32,
    pub yield_per_unit: f64,
}

/// Historical yield: same arithmetic as agricultural rows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalRowInput {
    pub period: String,
    pub activity_key: String,
    pub area: f64,
    pub yield_per_area: f64,
    /// Production figure recorded when the row was seeded
    pub recorded_quantity: f64,
    /// Value ("saldo") recorded when the row was seeded
    pub recorded_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HerdSex {
    Male,
    Female,
    #[default]
    Unspecified,
}

/// Herd inventory line: age band × sex with head count and unit value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdRowInput {
    pub age_band: String,
    pub sex: HerdSex,
    #[serde(deserialize_with = "deserialize_whole_count")]
    pub quantity: u32,
    pub unit_value: f64,
}

/// Asset listing line (machinery, implements)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetRowInput {
    pub description: String,
    pub model: String,
    pub year: String,
    pub color: String,
    pub value: f64,
}

/// Initial data for a new row of any table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", content = "row", rename_all = "kebab-case")]
pub enum RowInput {
    Prices(PriceRowInput),
    Agricultural(AgriculturalRowInput),
    Beef(BeefRowInput),
    Dairy(DairyRowInput),
    DiverseCrop(DiverseCropRowInput),
    Historical(HistoricalRowInput),
    Herd(HerdRowInput),
    Assets(AssetRowInput),
}

impl RowInput {
    pub fn kind(&self) -> TableKind {
        match self {
            RowInput::Prices(_) => TableKind::Prices,
            RowInput::Agricultural(_) => TableKind::Agricultural,
            RowInput::Beef(_) => TableKind::Beef,
            RowInput::Dairy(_) => TableKind::Dairy,
            RowInput::DiverseCrop(_) => TableKind::DiverseCrop,
            RowInput::Historical(_) => TableKind::Historical,
            RowInput::Herd(_) => TableKind::Herd,
            RowInput::Assets(_) => TableKind::Assets,
        }
    }

    /// An empty row for the given table (the "add row" button)
    pub fn empty(kind: TableKind) -> Self {
        match kind {
            TableKind::Prices => RowInput::Prices(PriceRowInput::default()),
            TableKind::Agricultural => RowInput::Agricultural(AgriculturalRowInput::default()),
            TableKind::Beef => RowInput::Beef(BeefRowInput::default()),
            TableKind::Dairy => RowInput::Dairy(DairyRowInput::default()),
            TableKind::DiverseCrop => RowInput::DiverseCrop(DiverseCropRowInput::default()),
            TableKind::Historical => RowInput::Historical(HistoricalRowInput::default()),
            TableKind::Herd => RowInput::Herd(HerdRowInput::default()),
            TableKind::Assets => RowInput::Assets(AssetRowInput::default()),
        }
    }

    /// Parse the JSON body of an "add row" request for a known table
    pub fn from_json(kind: TableKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            TableKind::Prices => RowInput::Prices(serde_json::from_value(value)?),
            TableKind::Agricultural => RowInput::Agricultural(serde_json::from_value(value)?),
            TableKind::Beef => RowInput::Beef(serde_json::from_value(value)?),
            TableKind::Dairy => RowInput::Dairy(serde_json::from_value(value)?),
            TableKind::DiverseCrop => RowInput::DiverseCrop(serde_json::from_value(value)?),
            TableKind::Historical => RowInput::Historical(serde_json::from_value(value)?),
            TableKind::Herd => RowInput::Herd(serde_json::from_value(value)?),
            TableKind::Assets => RowInput::Assets(serde_json::from_value(value)?),
        })
    }
}

/// Computed, read-only outputs of a row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RowOutput {
    pub derived_quantity: f64,
    pub derived_value: f64,
}

/// A row as displayed: inputs plus outputs with locale formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView<T> {
    pub id: RowId,
    pub input: T,
    pub output: RowOutput,
    pub formatted_quantity: String,
    pub formatted_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView<T> {
    pub kind: TableKind,
    pub rows: Vec<RowView<T>>,
    pub subtotal: f64,
    pub formatted_subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdTableView {
    #[serde(flatten)]
    pub table: TableView<HerdRowInput>,
    /// Total number of animals across all rows
    pub head_count: u64,
}

/// Registration state of a price row's key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PriceRowStatus {
    /// Key is empty; nothing registered
    Unkeyed,
    /// Row owns the registry entry for its key
    Registered,
    /// Another row already owns this key
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRowView {
    pub id: RowId,
    pub input: PriceRowInput,
    pub status: PriceRowStatus,
    pub formatted_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTableView {
    pub rows: Vec<PriceRowView>,
    pub registered_keys: usize,
}

/// Response for `GET /api/tables/:kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyTableView {
    Prices(PriceTableView),
    Agricultural(TableView<AgriculturalRowInput>),
    Beef(TableView<BeefRowInput>),
    Dairy(TableView<DairyRowInput>),
    DiverseCrop(TableView<DiverseCropRowInput>),
    Historical(TableView<HistoricalRowInput>),
    Herd(HerdTableView),
    Assets(TableView<AssetRowInput>),
}

/// Category and grand totals derived from the production table subtotals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateTotals {
    pub agricultural: f64,
    pub livestock_beef: f64,
    pub livestock_dairy: f64,
    pub diverse_crop: f64,
    /// Beef + dairy
    pub livestock_combined: f64,
    /// Agricultural + livestock combined + diverse crop
    pub grand: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormattedTotals {
    pub agricultural: String,
    pub livestock_beef: String,
    pub livestock_dairy: String,
    pub diverse_crop: String,
    pub livestock_combined: String,
    pub grand: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub totals: AggregateTotals,
    pub formatted: FormattedTotals,
}

/// Non-blocking field problem: the value was normalized and flagged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProducerSize {
    Small,
    Medium,
    Large,
    #[default]
    Unspecified,
}

/// Producer ("produtor") or partner ("sócio") data as entered
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerRecord {
    pub name: String,
    /// CPF or CNPJ, formatted or digits only
    pub document: String,
    pub size: ProducerSize,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertySituation {
    Individual,
    Joint,
    #[default]
    Unspecified,
}

/// Rural property data as entered
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRecord {
    pub name: String,
    /// Total area in hectares, locale formatted
    pub total_area: String,
    pub state: String,
    pub city: String,
    /// Land registry number ("matrícula"), 13 digits
    pub registration: String,
    /// Tenure condition ("condição de posse")
    pub tenure: String,
    pub owner_cnpj: String,
    pub situation: PropertySituation,
    /// Bare land value ("valor terra nua"), locale formatted
    pub bare_land_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView<T> {
    pub index: usize,
    /// Display label, e.g. "Sócio 1" or "Propriedade 2"; empty for the base record
    pub label: String,
    pub record: T,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyView {
    #[serde(flatten)]
    pub view: RecordView<PropertyRecord>,
    pub total_area_ha: f64,
    pub bare_land_value: f64,
    pub formatted_bare_land_value: String,
}

/// Raw field edit as typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEditRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAcceptedResponse {
    pub row_id: RowId,
    /// True while the debounced recompute has not fired yet
    pub pending: bool,
    pub warning: Option<ValidationWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRowResponse {
    pub kind: TableKind,
    pub row_id: RowId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIndexResponse {
    pub index: usize,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationResponse {
    pub totals: AggregateTotals,
    pub rows_recomputed: usize,
    /// Price rows whose key was refused during the pass
    pub rejections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Brazilian state (UF)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub code: String,
    pub name: String,
}

/// Result of a geography lookup after walking the fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum GeographyListing<T> {
    Available { source: String, items: Vec<T> },
    Unavailable,
}

impl<T> GeographyListing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            GeographyListing::Available { items, .. } => items,
            GeographyListing::Unavailable => &[],
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, GeographyListing::Available { .. })
    }
}

/// Photo metadata supplied on upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    pub name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUploadResponse {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoListResponse {
    pub photos: Vec<PhotoSummary>,
    /// False when the blob store could not be read
    pub available: bool,
}

/// Consistent, fully recomputed view of the whole workbook for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub generated_at: String,
    pub producers: Vec<RecordView<ProducerRecord>>,
    pub properties: Vec<PropertyView>,
    pub prices: PriceTableView,
    pub agricultural: TableView<AgriculturalRowInput>,
    pub beef: TableView<BeefRowInput>,
    pub dairy: TableView<DairyRowInput>,
    pub diverse_crop: TableView<DiverseCropRowInput>,
    pub historical: TableView<HistoricalRowInput>,
    pub herd: HerdTableView,
    pub assets: TableView<AssetRowInput>,
    pub totals: AggregateTotals,
    pub formatted_totals: FormattedTotals,
    pub photos: Vec<PhotoSummary>,
    pub photos_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_kind_round_trips_through_path_segment() {
        for kind in TableKind::ALL {
            assert_eq!(kind.as_str().parse::<TableKind>().unwrap(), kind);
        }
        assert!("livestock".parse::<TableKind>().is_err());
    }

    #[test]
    fn test_row_input_from_json_uses_defaults_for_missing_fields() {
        let value = serde_json::json!({ "activity_key": "MILHO", "area": 2.0 });
        let input = RowInput::from_json(TableKind::Agricultural, value).unwrap();

        match input {
            RowInput::Agricultural(row) => {
                assert_eq!(row.activity_key, "MILHO");
                assert_eq!(row.area, 2.0);
                assert_eq!(row.yield_per_area, 0.0);
                assert!(row.period.is_empty());
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_fractional_counts_are_truncated_on_entry() {
        let value = serde_json::json!({ "activity_key": "BANANA", "whole_count": 12.8, "yield_per_unit": 3.0 });
        match RowInput::from_json(TableKind::DiverseCrop, value).unwrap() {
            RowInput::DiverseCrop(row) => assert_eq!(row.whole_count, 12),
            other => panic!("unexpected variant {:?}", other),
        }

        let value = serde_json::json!({ "cow_count": 20 });
        match RowInput::from_json(TableKind::Dairy, value).unwrap() {
            RowInput::Dairy(row) => assert_eq!(row.cow_count, 20),
            other => panic!("unexpected variant {:?}", other),
        }

        let value = serde_json::json!({ "quantity": -4.5 });
        match RowInput::from_json(TableKind::Herd, value).unwrap() {
            RowInput::Herd(row) => assert_eq!(row.quantity, 0),
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_price_row_status_serializes_with_state_tag() {
        let status = PriceRowStatus::Rejected { reason: "duplicate".to_string() };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "rejected");
        assert_eq!(json["reason"], "duplicate");
    }

    #[test]
    fn test_geography_listing_items() {
        let listing = GeographyListing::Available {
            source: "bundled".to_string(),
            items: vec!["Guaxupé".to_string()],
        };
        assert!(listing.is_available());
        assert_eq!(listing.items().len(), 1);

        let unavailable: GeographyListing<String> = GeographyListing::Unavailable;
        assert!(unavailable.items().is_empty());
    }
}
