// svckit/src/database/demo.rs
//
// Seeded synthetic SIH grains for running the dashboard without a warehouse
//

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::errors::DashError;
use crate::types::{columns, ColumnValue, IcsapFlag, RowData};
use super::factory::WarehouseConnection;

const GRAINS_PER_MONTH: usize = 48;

const AGE_BRACKETS: &[&str] = &[
    "00 a 04 anos",
    "05 a 19 anos",
    "20 a 39 anos",
    "40 a 59 anos",
    "60 a 79 anos",
    "80 anos e mais",
];
const SEXES: &[&str] = &["Feminino", "Masculino"];
const ADMISSION_TYPES: &[&str] = &["Eletivo", "Urgência"];
const CARE_LOCATIONS: &[&str] = &["Residente", "Não residente"];
const CHAPTERS: &[&str] = &[
    "I. Algumas doenças infecciosas e parasitárias",
    "IV. Doenças endócrinas nutricionais e metabólicas",
    "IX. Doenças do aparelho circulatório",
    "X. Doenças do aparelho respiratório",
    "XI. Doenças do aparelho digestivo",
    "XIV. Doenças do aparelho geniturinário",
];
const SUS_LINKAGES: &[&str] = &["Público", "Privado conveniado", "Filantrópico"];
const MANAGEMENT_TYPES: &[&str] = &["Municipal", "Estadual", "Dupla"];
const FACILITIES: &[&str] = &["2077485", "2078015", "2080532", "2688689"];

pub struct DemoConnection {
    months: u32,
    seed: u64,
    last_period: NaiveDate,
}

impl DemoConnection {
    pub fn new(months: u32, seed: u64) -> Self {
        Self {
            months: months.max(1),
            seed,
            // Fixed anchor keeps the generated table identical across runs.
            last_period: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap_or_default(),
        }
    }

    pub fn generate(&self) -> Vec<RowData> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut rows = Vec::with_capacity(self.months as usize * GRAINS_PER_MONTH);

        for offset in (0..self.months).rev() {
            let Some(period) = self.last_period.checked_sub_months(Months::new(offset)) else {
                continue;
            };
            // Respiratory season pushes the avoidable share up mid-year.
            let icsap_share = if (5..=8).contains(&period.month()) { 0.28 } else { 0.18 };

            for _ in 0..GRAINS_PER_MONTH {
                let flag = if rng.gen_bool(icsap_share) {
                    IcsapFlag::Icsap
                } else {
                    IcsapFlag::NonIcsap
                };
                let row = RowData::new()
                    .with(columns::AGE_BRACKET, pick(&mut rng, AGE_BRACKETS))
                    .with(columns::SEX, pick(&mut rng, SEXES))
                    .with(columns::ADMISSION_TYPE, pick(&mut rng, ADMISSION_TYPES))
                    .with(columns::CARE_LOCATION, pick(&mut rng, CARE_LOCATIONS))
                    .with(columns::YEAR, ColumnValue::BigInt(period.year() as i64))
                    .with(columns::MONTH, ColumnValue::BigInt(period.month() as i64))
                    .with(columns::COST_QUINTILE, ColumnValue::BigInt(rng.gen_range(1..=5)))
                    .with(columns::DIAGNOSIS_CHAPTER, pick(&mut rng, CHAPTERS))
                    .with(columns::ICSAP, ColumnValue::Text(flag.raw().to_string()))
                    .with(columns::SUS_LINKAGE, pick(&mut rng, SUS_LINKAGES))
                    .with(columns::MANAGEMENT, pick(&mut rng, MANAGEMENT_TYPES))
                    .with(columns::FACILITY, pick(&mut rng, FACILITIES))
                    .with(columns::COUNT, ColumnValue::BigInt(rng.gen_range(1..120)));
                rows.push(row);
            }
        }

        rows
    }
}

fn pick(rng: &mut StdRng, values: &[&str]) -> ColumnValue {
    ColumnValue::Text(values[rng.gen_range(0..values.len())].to_string())
}

#[async_trait]
impl WarehouseConnection for DemoConnection {
    async fn query(&self, _sql: &str) -> Result<Vec<RowData>, DashError> {
        let rows = self.generate();
        info!("Generated {} demo rows over {} months", rows.len(), self.months);
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), DashError> {
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "demo"
    }
}
