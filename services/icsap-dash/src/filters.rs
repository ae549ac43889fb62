//! Filter option extraction and selection.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use svckit::errors::DashError;
use svckit::types::{AdmissionRecord, Dimension, FilterValue, IcsapFlag, OptionOrder};

use crate::labels::FlagLabels;

/// Distinct non-null values of `dimension`, ordered per the dimension's convention.
pub fn distinct_values<'a>(
    records: impl IntoIterator<Item = &'a AdmissionRecord>,
    dimension: Dimension,
) -> Vec<FilterValue> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for value in records.into_iter().filter_map(|r| r.value(dimension)) {
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }

    match dimension.order() {
        OptionOrder::Ascending => values.sort_by(FilterValue::cmp_natural),
        OptionOrder::Descending => values.sort_by(|a, b| b.cmp_natural(a)),
        OptionOrder::FirstSeen => {}
    }
    values
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionOptions {
    pub dimension: Dimension,
    pub label: String,
    pub values: Vec<FilterValue>,
    /// Human-facing text for each value, index-aligned with `values`.
    pub display: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub dimensions: Vec<DimensionOptions>,
}

impl FilterOptions {
    pub fn extract(records: &[AdmissionRecord], labels: &FlagLabels) -> Self {
        let dimensions = Dimension::ALL
            .iter()
            .map(|&dimension| {
                let values = distinct_values(records, dimension);
                let display = values
                    .iter()
                    .map(|value| match (dimension, value) {
                        (Dimension::Icsap, FilterValue::Text(raw)) => IcsapFlag::parse(raw)
                            .map(|flag| labels.display(flag).to_string())
                            .unwrap_or_else(|| raw.clone()),
                        _ => value.to_string(),
                    })
                    .collect();
                DimensionOptions {
                    dimension,
                    label: dimension.label().to_string(),
                    values,
                    display,
                }
            })
            .collect();

        Self { dimensions }
    }

    pub fn values(&self, dimension: Dimension) -> &[FilterValue] {
        self.dimensions
            .iter()
            .find(|d| d.dimension == dimension)
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }

    /// The default widget state: everything selected.
    pub fn select_all(&self) -> FilterSelection {
        FilterSelection {
            selected: self
                .dimensions
                .iter()
                .map(|d| (d.dimension, d.values.iter().cloned().collect()))
                .collect(),
        }
    }
}

/// Chosen values per dimension. A dimension absent from the map is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub selected: BTreeMap<Dimension, BTreeSet<FilterValue>>,
}

impl FilterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn restrict<V: Into<FilterValue>>(
        mut self,
        dimension: Dimension,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.selected
            .insert(dimension, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.selected.is_empty()
    }

    /// Brings every chosen value to the type the dimension stores: integers for
    /// year and month, text elsewhere, and source literals for ICSAP display
    /// labels. Values that cannot be converted are rejected rather than left to
    /// silently match nothing.
    pub fn normalized(self, labels: &FlagLabels) -> Result<Self, DashError> {
        let selected = self
            .selected
            .into_iter()
            .map(|(dimension, chosen)| {
                let chosen = chosen
                    .into_iter()
                    .map(|value| coerce(dimension, value, labels))
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Ok((dimension, chosen))
            })
            .collect::<Result<_, DashError>>()?;
        Ok(Self { selected })
    }

    /// A record matches when every restricted dimension holds one of its chosen values.
    /// Null values never match a restricted dimension.
    pub fn matches(&self, record: &AdmissionRecord) -> bool {
        self.selected.iter().all(|(dimension, chosen)| {
            record
                .value(*dimension)
                .map_or(false, |value| chosen.contains(&value))
        })
    }

    pub fn apply<'a>(&self, records: &'a [AdmissionRecord]) -> Vec<&'a AdmissionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn coerce(
    dimension: Dimension,
    value: FilterValue,
    labels: &FlagLabels,
) -> Result<FilterValue, DashError> {
    if dimension.is_integer() {
        return value.as_number().map(FilterValue::Int).ok_or_else(|| {
            DashError::Filter(format!("{} expects an integer, got {:?}", dimension, value.to_string()))
        });
    }

    let text = value.to_string();
    if dimension == Dimension::Icsap {
        return labels
            .flag_for(&text)
            .map(|flag| FilterValue::Text(flag.raw().to_string()))
            .ok_or_else(|| DashError::Filter(format!("unknown {} value {:?}", dimension, text)));
    }
    Ok(FilterValue::Text(text))
}
