// svckit/src/database/bigquery.rs
//
// BigQuery REST connection (jobs.query + getQueryResults paging)
//

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::WarehouseConfig;
use crate::errors::DashError;
use crate::types::{ColumnValue, RowData};
use super::factory::WarehouseConnection;
use super::query_builder::QueryBuilder;

#[derive(Clone)]
pub struct BigQueryConnection {
    http: reqwest::Client,
    config: WarehouseConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    max_results: u32,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    job_complete: Option<bool>,
    job_reference: Option<JobReference>,
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    page_token: Option<String>,
    total_rows: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl BigQueryConnection {
    pub fn new(config: &WarehouseConfig) -> Result<Self, DashError> {
        let http = reqwest::Client::builder()
            .user_agent("icsap-dash/0.1")
            .timeout(config.request_timeout())
            .build()?;

        info!(
            "BigQuery connection prepared for project {} ({})",
            config.project_id, config.endpoint
        );

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn token(&self) -> Result<String, DashError> {
        self.config.resolve_token().ok_or_else(|| {
            DashError::Auth(format!(
                "no access token configured (set warehouse.access_token or {})",
                self.config.token_env
            ))
        })
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/projects/{}/queries",
            self.config.endpoint.trim_end_matches('/'),
            self.config.project_id
        )
    }

    async fn start_query(&self, token: &str, sql: &str) -> Result<QueryResponse, DashError> {
        let request = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            max_results: self.config.page_size,
            timeout_ms: self.config.request_timeout().as_millis() as u64,
            location: self.config.location.as_deref(),
        };

        let response = self
            .http
            .post(self.queries_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        read_page(response).await
    }

    async fn fetch_results(
        &self,
        token: &str,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse, DashError> {
        let mut params = vec![
            ("maxResults", self.config.page_size.to_string()),
            ("timeoutMs", self.config.request_timeout().as_millis().to_string()),
        ];
        if let Some(location) = job.location.as_deref().or(self.config.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(page_token) = page_token {
            params.push(("pageToken", page_token.to_string()));
        }

        let url = Url::parse_with_params(
            &format!("{}/{}", self.queries_url(), job.job_id),
            &params,
        )
        .map_err(|e| DashError::Config(format!("invalid BigQuery endpoint: {}", e)))?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        read_page(response).await
    }
}

#[async_trait]
impl WarehouseConnection for BigQueryConnection {
    async fn query(&self, sql: &str) -> Result<Vec<RowData>, DashError> {
        let token = self.token()?;
        debug!("Submitting BigQuery job: {}", sql);

        let mut page = self.start_query(&token, sql).await?;
        let job = page
            .job_reference
            .clone()
            .ok_or_else(|| DashError::Query("response carried no job reference".to_string()))?;

        let mut schema: Option<TableSchema> = None;
        let mut rows = Vec::new();

        loop {
            if !page.job_complete.unwrap_or(true) {
                debug!("Job {} still running, waiting on getQueryResults", job.job_id);
                page = self.fetch_results(&token, &job, None).await?;
                continue;
            }

            if schema.is_none() {
                schema = page.schema.take();
            }
            let fields = schema
                .as_ref()
                .map(|s| s.fields.as_slice())
                .ok_or_else(|| DashError::Schema("query result has no schema".to_string()))?;

            if let Some(total) = page.total_rows.as_deref() {
                debug!("Job {} page: {} rows of {}", job.job_id, page.rows.len(), total);
            }
            rows.extend(decode_rows(fields, std::mem::take(&mut page.rows))?);

            match page.page_token.take() {
                Some(next) => page = self.fetch_results(&token, &job, Some(&next)).await?,
                None => break,
            }
        }

        info!("BigQuery job {} returned {} rows", job.job_id, rows.len());
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), DashError> {
        self.query(&QueryBuilder::build_health_query()).await?;
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "bigquery"
    }
}

async fn read_page(response: reqwest::Response) -> Result<QueryResponse, DashError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<QueryResponse>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    error!("BigQuery request failed with {}: {}", status, message);

    Err(classify_failure(status, message))
}

fn classify_failure(status: StatusCode, message: String) -> DashError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DashError::Auth(message),
        _ => DashError::Query(format!("HTTP {}: {}", status, message)),
    }
}

fn decode_rows(fields: &[FieldSchema], rows: Vec<TableRow>) -> Result<Vec<RowData>, DashError> {
    rows.into_iter()
        .map(|row| {
            if row.f.len() != fields.len() {
                return Err(DashError::Schema(format!(
                    "row has {} cells but schema has {} fields",
                    row.f.len(),
                    fields.len()
                )));
            }
            let mut data = RowData::new();
            for (field, cell) in fields.iter().zip(row.f) {
                data.columns
                    .insert(field.name.clone(), decode_cell(&field.field_type, cell.v));
            }
            Ok(data)
        })
        .collect()
}

/// BigQuery encodes every scalar as a string; the schema type says how to read it.
fn decode_cell(field_type: &str, value: serde_json::Value) -> ColumnValue {
    let raw = match value {
        serde_json::Value::Null => return ColumnValue::Null,
        serde_json::Value::String(s) => s,
        other => return ColumnValue::Text(other.to_string()),
    };

    match field_type.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT64" => raw
            .parse()
            .map(ColumnValue::BigInt)
            .unwrap_or(ColumnValue::Text(raw)),
        "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => raw
            .parse()
            .map(ColumnValue::Double)
            .unwrap_or(ColumnValue::Text(raw)),
        "BOOLEAN" | "BOOL" => ColumnValue::Boolean(raw.eq_ignore_ascii_case("true")),
        _ => ColumnValue::Text(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "kind": "bigquery#queryResponse",
        "jobComplete": true,
        "jobReference": {"projectId": "escolap2p", "jobId": "job_abc", "location": "US"},
        "totalRows": "2",
        "schema": {"fields": [
            {"name": "ANO_INT", "type": "INTEGER", "mode": "NULLABLE"},
            {"name": "IS_ICSAP", "type": "STRING", "mode": "NULLABLE"},
            {"name": "total_aih_distintos_neste_grao", "type": "INTEGER", "mode": "NULLABLE"},
            {"name": "peso", "type": "FLOAT", "mode": "NULLABLE"}
        ]},
        "rows": [
            {"f": [{"v": "2024"}, {"v": "Sim"}, {"v": "12"}, {"v": "0.5"}]},
            {"f": [{"v": "2023"}, {"v": "Não"}, {"v": null}, {"v": "1"}]}
        ]
    }"#;

    #[test]
    fn test_decode_query_page() {
        let page: QueryResponse = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.job_complete, Some(true));
        assert!(page.page_token.is_none());

        let fields = page.schema.as_ref().unwrap().fields.as_slice();
        let rows = decode_rows(fields, page.rows).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ANO_INT"), Some(&ColumnValue::BigInt(2024)));
        assert_eq!(rows[0].get("peso"), Some(&ColumnValue::Double(0.5)));
        assert_eq!(rows[1].get("IS_ICSAP"), Some(&ColumnValue::Text("Não".into())));
        assert_eq!(
            rows[1].get("total_aih_distintos_neste_grao"),
            Some(&ColumnValue::Null)
        );
    }

    #[test]
    fn test_cell_count_mismatch_is_schema_error() {
        let fields = vec![FieldSchema {
            name: "ANO_INT".into(),
            field_type: "INTEGER".into(),
        }];
        let rows = vec![TableRow { f: vec![] }];
        assert!(matches!(decode_rows(&fields, rows), Err(DashError::Schema(_))));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "expired".into()),
            DashError::Auth(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "denied".into()),
            DashError::Auth(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "Syntax error".into()),
            DashError::Query(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let config = WarehouseConfig {
            access_token: None,
            token_env: "ICSAP_TEST_TOKEN_NEVER_SET".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let conn = BigQueryConnection::new(&config).unwrap();
        assert!(matches!(conn.query("SELECT 1").await, Err(DashError::Auth(_))));
    }
}
