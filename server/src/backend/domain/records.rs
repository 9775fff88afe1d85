//! Producer and property records.
//!
//! Both lists start with one base record that can be edited but never
//! removed. Additional records are appended and removed from the end, and are
//! labeled "Sócio N" / "Propriedade N" counting from the first addition.

use shared::{ProducerRecord, PropertyRecord, PropertyView, RecordView, ValidationWarning};

use super::errors::LaudoError;
use super::numeric::{format_currency, parse_locale_decimal};
use super::validation::{
    validate_cnpj, validate_decimal, validate_document, validate_name, validate_phone,
    validate_registration,
};

pub trait RecordSpec: Clone + Default + Send + 'static {
    /// Label prefix for additional records
    const LABEL: &'static str;

    fn validate(&self) -> Vec<ValidationWarning>;

    /// Trim and upper-case free-text fields as they appear in the report
    fn normalize(&mut self);
}

impl RecordSpec for ProducerRecord {
    const LABEL: &'static str = "Sócio";

    fn validate(&self) -> Vec<ValidationWarning> {
        [
            validate_name("name", "Nome", &self.name),
            validate_document("document", &self.document),
            validate_phone("phone", &self.phone),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_uppercase();
        self.document = self.document.trim().to_string();
        self.phone = self.phone.trim().to_string();
    }
}

impl RecordSpec for PropertyRecord {
    const LABEL: &'static str = "Propriedade";

    fn validate(&self) -> Vec<ValidationWarning> {
        [
            validate_decimal("total_area", &self.total_area),
            validate_name("city", "Cidade", &self.city),
            validate_registration("registration", &self.registration),
            validate_cnpj("owner_cnpj", &self.owner_cnpj),
            validate_decimal("bare_land_value", &self.bare_land_value),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_uppercase();
        self.state = self.state.trim().to_uppercase();
        self.city = self.city.trim().to_string();
        self.tenure = self.tenure.trim().to_uppercase();
    }
}

#[derive(Debug, Clone)]
pub struct RecordList<T> {
    records: Vec<T>,
}

impl<T: RecordSpec> Default for RecordList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RecordSpec> RecordList<T> {
    /// A list holding only the empty base record
    pub fn new() -> Self {
        Self {
            records: vec![T::default()],
        }
    }

    /// Append an additional record, returning its index
    pub fn add(&mut self, mut record: T) -> (usize, Vec<ValidationWarning>) {
        record.normalize();
        let warnings = record.validate();
        self.records.push(record);
        (self.records.len() - 1, warnings)
    }

    pub fn update(&mut self, index: usize, mut record: T) -> Result<Vec<ValidationWarning>, LaudoError> {
        let slot = self
            .records
            .get_mut(index)
            .ok_or(LaudoError::RecordNotFound { index })?;
        record.normalize();
        let warnings = record.validate();
        *slot = record;
        Ok(warnings)
    }

    /// Remove the most recently added record; the base record stays
    pub fn remove_last(&mut self) -> Result<T, LaudoError> {
        if self.records.len() <= 1 {
            return Err(LaudoError::NoAdditionalRecord);
        }
        self.records.pop().ok_or(LaudoError::NoAdditionalRecord)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn label(index: usize) -> String {
        if index == 0 {
            String::new()
        } else {
            format!("{} {}", T::LABEL, index)
        }
    }

    pub fn views(&self) -> Vec<RecordView<T>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| RecordView {
                index,
                label: Self::label(index),
                record: record.clone(),
                warnings: record.validate(),
            })
            .collect()
    }
}

/// Property views with their area and bare-land value parsed
pub fn property_views(list: &RecordList<PropertyRecord>) -> Vec<PropertyView> {
    list.views()
        .into_iter()
        .map(|view| {
            let total_area_ha = parse_locale_decimal(&view.record.total_area);
            let bare_land_value = parse_locale_decimal(&view.record.bare_land_value);
            PropertyView {
                view,
                total_area_ha,
                bare_land_value,
                formatted_bare_land_value: format_currency(bare_land_value),
            }
        })
        .collect()
}
