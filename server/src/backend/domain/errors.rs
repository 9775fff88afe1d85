use shared::{RowId, TableKind};

/// Errors raised by workbook operations.
///
/// Malformed field values are not errors: they are normalized and reported
/// as `ValidationWarning`s instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LaudoError {
    #[error("Já existe um preço para {key}. Remova a linha duplicada ou altere a cultura.")]
    DuplicateKey { key: String },
    #[error("Row {id} not found in table {kind}")]
    RowNotFound { kind: TableKind, id: RowId },
    #[error("Table {kind} has no field '{field}'")]
    UnknownField { kind: TableKind, field: String },
    #[error("Invalid row data for table {kind}: {reason}")]
    InvalidRowInput { kind: TableKind, reason: String },
    #[error("Não há registros adicionais para remover.")]
    NoAdditionalRecord,
    #[error("Record {index} not found")]
    RecordNotFound { index: usize },
}

impl LaudoError {
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        LaudoError::DuplicateKey { key: key.into() }
    }
}
