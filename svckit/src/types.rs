use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::DashError;

/// Source column names of the admissions table.
pub mod columns {
    pub const AGE_BRACKET: &str = "FAIXA_ETARIA";
    pub const SEX: &str = "SEXO_DESC";
    pub const ADMISSION_TYPE: &str = "TIPO_INTERNAMENTO";
    pub const CARE_LOCATION: &str = "LOCAL_ATENDIMENTO";
    pub const YEAR: &str = "ANO_INT";
    pub const MONTH: &str = "MES_INT";
    pub const COST_QUINTILE: &str = "QUINTIL_CUSTO";
    pub const DIAGNOSIS_CHAPTER: &str = "capitulo";
    pub const ICSAP: &str = "IS_ICSAP";
    pub const SUS_LINKAGE: &str = "TIPO_VINC_SUS";
    pub const MANAGEMENT: &str = "TIPO_GESTAO";
    pub const FACILITY: &str = "CNES";
    pub const COUNT: &str = "total_aih_distintos_neste_grao";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub columns: HashMap<String, ColumnValue>,
}

impl RowData {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: ColumnValue) -> Self {
        self.columns.insert(name.to_string(), value);
        self
    }

    /// Exact lookup first, then ASCII case-insensitive.
    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.columns.get(name).or_else(|| {
            self.columns
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }
}

impl Default for RowData {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Text(String),
    BigInt(i64),
    Double(f64),
    Boolean(bool),
    Null,
}

impl ColumnValue {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ColumnValue::Null,
            serde_json::Value::Bool(b) => ColumnValue::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ColumnValue::BigInt(i)
                } else if let Some(f) = n.as_f64() {
                    ColumnValue::Double(f)
                } else {
                    ColumnValue::Null
                }
            }
            serde_json::Value::String(s) => ColumnValue::Text(s.clone()),
            other => ColumnValue::Text(other.to_string()),
        }
    }

    /// Textual form used for categorical dimensions. Integral doubles lose their fraction.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ColumnValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            ColumnValue::BigInt(i) => Some(i.to_string()),
            ColumnValue::Double(f) if f.fract() == 0.0 && f.is_finite() => {
                Some(format!("{}", *f as i64))
            }
            ColumnValue::Double(f) => Some(f.to_string()),
            ColumnValue::Boolean(b) => Some(b.to_string()),
            ColumnValue::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::BigInt(i) => Some(*i),
            ColumnValue::Double(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            ColumnValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

/// The two literal values the source uses for the ICSAP indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcsapFlag {
    Icsap,
    NonIcsap,
}

impl IcsapFlag {
    pub const ALL: [IcsapFlag; 2] = [IcsapFlag::Icsap, IcsapFlag::NonIcsap];

    /// Literal stored in the warehouse.
    pub fn raw(&self) -> &'static str {
        match self {
            IcsapFlag::Icsap => "Sim",
            IcsapFlag::NonIcsap => "Não",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sim" => Some(IcsapFlag::Icsap),
            "não" => Some(IcsapFlag::NonIcsap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    AgeBracket,
    Sex,
    AdmissionType,
    CareLocation,
    Year,
    Month,
    CostQuintile,
    DiagnosisChapter,
    Icsap,
    SusLinkage,
    Management,
    Facility,
}

/// How a dimension's distinct values are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrder {
    Ascending,
    Descending,
    FirstSeen,
}

impl Dimension {
    pub const ALL: [Dimension; 12] = [
        Dimension::AgeBracket,
        Dimension::Sex,
        Dimension::AdmissionType,
        Dimension::CareLocation,
        Dimension::Year,
        Dimension::Month,
        Dimension::CostQuintile,
        Dimension::DiagnosisChapter,
        Dimension::Icsap,
        Dimension::SusLinkage,
        Dimension::Management,
        Dimension::Facility,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Dimension::AgeBracket => columns::AGE_BRACKET,
            Dimension::Sex => columns::SEX,
            Dimension::AdmissionType => columns::ADMISSION_TYPE,
            Dimension::CareLocation => columns::CARE_LOCATION,
            Dimension::Year => columns::YEAR,
            Dimension::Month => columns::MONTH,
            Dimension::CostQuintile => columns::COST_QUINTILE,
            Dimension::DiagnosisChapter => columns::DIAGNOSIS_CHAPTER,
            Dimension::Icsap => columns::ICSAP,
            Dimension::SusLinkage => columns::SUS_LINKAGE,
            Dimension::Management => columns::MANAGEMENT,
            Dimension::Facility => columns::FACILITY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::AgeBracket => "Faixa etária",
            Dimension::Sex => "Sexo",
            Dimension::AdmissionType => "Tipo de internamento",
            Dimension::CareLocation => "Local de atendimento",
            Dimension::Year => "Ano",
            Dimension::Month => "Mês",
            Dimension::CostQuintile => "Quintil de custo",
            Dimension::DiagnosisChapter => "Capítulo CID",
            Dimension::Icsap => "Tipo ICSAP",
            Dimension::SusLinkage => "Vínculo SUS",
            Dimension::Management => "Tipo de gestão",
            Dimension::Facility => "CNES",
        }
    }

    /// Year and month hold integers; every other dimension is text.
    pub fn is_integer(&self) -> bool {
        matches!(self, Dimension::Year | Dimension::Month)
    }

    pub fn order(&self) -> OptionOrder {
        match self {
            Dimension::Year => OptionOrder::Descending,
            Dimension::AgeBracket
            | Dimension::Month
            | Dimension::CostQuintile
            | Dimension::DiagnosisChapter
            | Dimension::Facility => OptionOrder::Ascending,
            Dimension::Sex
            | Dimension::AdmissionType
            | Dimension::CareLocation
            | Dimension::Icsap
            | Dimension::SusLinkage
            | Dimension::Management => OptionOrder::FirstSeen,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Int(i) => write!(f, "{}", i),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl FilterValue {
    /// Numeric reading of the value; text counts when it parses as an integer.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            FilterValue::Int(i) => Some(*i),
            FilterValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Ascending order that puts numbers before text and compares numbers by value,
    /// so `"9"` sorts before `"10"`.
    pub fn cmp_natural(&self, other: &Self) -> std::cmp::Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.cmp(other)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => self.cmp(other),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Int(i)
    }
}

/// One aggregated grain of hospital admissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    pub age_bracket: Option<String>,
    pub sex: Option<String>,
    pub admission_type: Option<String>,
    pub care_location: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub cost_quintile: Option<String>,
    pub diagnosis_chapter: Option<String>,
    pub icsap: IcsapFlag,
    pub sus_linkage: Option<String>,
    pub management: Option<String>,
    pub facility: Option<String>,
    pub admissions: u64,
}

pub type Dataset = Vec<AdmissionRecord>;

impl AdmissionRecord {
    /// A grain with only the fields the aggregations read; handy for fixtures.
    pub fn grain(year: i32, month: u32, icsap: IcsapFlag, admissions: u64) -> Self {
        Self {
            age_bracket: None,
            sex: None,
            admission_type: None,
            care_location: None,
            year: Some(year),
            month: Some(month),
            cost_quintile: None,
            diagnosis_chapter: None,
            icsap,
            sus_linkage: None,
            management: None,
            facility: None,
            admissions,
        }
    }

    pub fn value(&self, dimension: Dimension) -> Option<FilterValue> {
        let text = |v: &Option<String>| v.clone().map(FilterValue::Text);
        match dimension {
            Dimension::AgeBracket => text(&self.age_bracket),
            Dimension::Sex => text(&self.sex),
            Dimension::AdmissionType => text(&self.admission_type),
            Dimension::CareLocation => text(&self.care_location),
            Dimension::Year => self.year.map(|y| FilterValue::Int(y as i64)),
            Dimension::Month => self.month.map(|m| FilterValue::Int(m as i64)),
            Dimension::CostQuintile => text(&self.cost_quintile),
            Dimension::DiagnosisChapter => text(&self.diagnosis_chapter),
            Dimension::Icsap => Some(FilterValue::Text(self.icsap.raw().to_string())),
            Dimension::SusLinkage => text(&self.sus_linkage),
            Dimension::Management => text(&self.management),
            Dimension::Facility => text(&self.facility),
        }
    }

    /// First day of the admission month, when both parts are present.
    pub fn period(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, 1)
    }
}

impl TryFrom<&RowData> for AdmissionRecord {
    type Error = DashError;

    fn try_from(row: &RowData) -> Result<Self, Self::Error> {
        let text = |name: &str| row.get(name).and_then(ColumnValue::as_text);

        let flag_raw = text(columns::ICSAP).ok_or_else(|| {
            DashError::Schema(format!("column {} is missing or null", columns::ICSAP))
        })?;
        let icsap = IcsapFlag::parse(&flag_raw).ok_or_else(|| {
            DashError::Schema(format!("unexpected {} value: {:?}", columns::ICSAP, flag_raw))
        })?;

        let admissions = match row.get(columns::COUNT) {
            Some(value) if !value.is_null() => {
                let count = value.as_i64().ok_or_else(|| {
                    DashError::Schema(format!("{} is not an integer: {:?}", columns::COUNT, value))
                })?;
                u64::try_from(count).map_err(|_| {
                    DashError::Schema(format!("{} is negative: {}", columns::COUNT, count))
                })?
            }
            _ => 0,
        };

        let year = match row.get(columns::YEAR).filter(|v| !v.is_null()) {
            Some(value) => {
                let year = value.as_i64().and_then(|y| i32::try_from(y).ok()).ok_or_else(|| {
                    DashError::Schema(format!("{} is not a year: {:?}", columns::YEAR, value))
                })?;
                Some(year)
            }
            None => None,
        };

        let month = match row.get(columns::MONTH).filter(|v| !v.is_null()) {
            Some(value) => {
                let month = value
                    .as_i64()
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| {
                        DashError::Schema(format!("{} is not a month: {:?}", columns::MONTH, value))
                    })?;
                Some(month as u32)
            }
            None => None,
        };

        Ok(Self {
            age_bracket: text(columns::AGE_BRACKET),
            sex: text(columns::SEX),
            admission_type: text(columns::ADMISSION_TYPE),
            care_location: text(columns::CARE_LOCATION),
            year,
            month,
            cost_quintile: text(columns::COST_QUINTILE),
            diagnosis_chapter: text(columns::DIAGNOSIS_CHAPTER),
            icsap,
            sus_linkage: text(columns::SUS_LINKAGE),
            management: text(columns::MANAGEMENT),
            facility: text(columns::FACILITY),
            admissions,
        })
    }
}

/// Decodes every row, failing on the first one that breaks the schema.
pub fn decode_rows(rows: &[RowData]) -> Result<Dataset, DashError> {
    rows.iter().map(AdmissionRecord::try_from).collect()
}
