// HTTP repository implementation for the telemetry REST API
use crate::application::telemetry_repository::{FetchError, TelemetryRepository};
use crate::domain::reading::{AlignmentError, Metric, Reading};
use crate::infrastructure::config::{ApiSettings, MetricSettings};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const ID_FIELD: &str = "id";
const TIMESTAMP_FIELD: &str = "data";

#[derive(Debug, Clone)]
pub struct HttpTelemetryRepository {
    client: reqwest::Client,
    base_url: String,
    metrics: HashMap<Metric, MetricSettings>,
}

impl HttpTelemetryRepository {
    pub fn new(api: &ApiSettings, metrics: HashMap<Metric, MetricSettings>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            metrics,
        })
    }

    fn settings(&self, metric: Metric) -> MetricSettings {
        self.metrics
            .get(&metric)
            .cloned()
            .unwrap_or_else(|| MetricSettings::defaults_for(metric))
    }

    fn build_url(&self, settings: &MetricSettings) -> String {
        let segments: Vec<_> = settings
            .path
            .trim_matches('/')
            .split('/')
            .map(urlencoding::encode)
            .collect();
        format!("{}/{}", self.base_url, segments.join("/"))
    }
}

#[async_trait]
impl TelemetryRepository for HttpTelemetryRepository {
    async fn fetch_readings(&self, metric: Metric) -> Result<Vec<Reading>, FetchError> {
        let settings = self.settings(metric);
        let url = self.build_url(&settings);

        tracing::debug!(%metric, %url, "Fetching readings");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let rows = response.json::<Vec<Value>>().await?;
        let total = rows.len();
        let readings = decode_rows(rows, &settings.value_field);

        tracing::debug!(
            %metric,
            total,
            kept = readings.len(),
            "Decoded readings"
        );
        Ok(readings)
    }
}

/// Decodes raw API rows, skipping the malformed ones.
pub fn decode_rows(rows: Vec<Value>, value_field: &str) -> Vec<Reading> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| match decode_row(row, value_field) {
            Ok(reading) => Some(reading),
            Err(e) => {
                tracing::warn!("Skipping reading #{}: {}", idx, e);
                None
            }
        })
        .collect()
}

fn decode_row(row: &Value, value_field: &str) -> Result<Reading, AlignmentError> {
    let field = |name: &str| {
        row.get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| AlignmentError::MissingField(name.to_string()))
    };

    let id = match field(ID_FIELD)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(AlignmentError::MissingField(ID_FIELD.to_string())),
    };

    let raw_ts = field(TIMESTAMP_FIELD)?
        .as_str()
        .ok_or_else(|| AlignmentError::InvalidTimestamp(row[TIMESTAMP_FIELD].to_string()))?;
    let timestamp =
        parse_timestamp(raw_ts).ok_or_else(|| AlignmentError::InvalidTimestamp(raw_ts.to_string()))?;

    let value = match field(value_field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| AlignmentError::InvalidValue(value_field.to_string()))?;

    Ok(Reading::new(id, timestamp, value))
}

/// Parses the API's date strings. Offsets are kept as wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn repository(base_url: String) -> HttpTelemetryRepository {
        let api = ApiSettings {
            base_url,
            timeout_secs: 5,
        };
        let metrics = Metric::ALL
            .into_iter()
            .map(|m| (m, MetricSettings::defaults_for(m)))
            .collect();
        HttpTelemetryRepository::new(&api, metrics).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap();

        assert_eq!(parse_timestamp("2020-01-01T12:30:05"), Some(expected));
        assert_eq!(parse_timestamp("2020-01-01 12:30:05"), Some(expected));
        assert_eq!(parse_timestamp("2020-01-01T12:30:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2020-01-01T12:30:05-03:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2020-01-01T12:30:05.250").map(|t| t.format("%H:%M:%S").to_string()),
            Some("12:30:05".to_string())
        );
        assert_eq!(
            parse_timestamp("2020-01-01"),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_decode_rows_skips_malformed() {
        let rows = vec![
            json!({"id": "s1", "data": "2020-01-01T00:00:00", "umidade": 55.5}),
            json!({"id": 7, "data": "2020-01-01T00:00:05", "umidade": "60"}),
            json!({"data": "2020-01-01T00:00:05", "umidade": 1}),
            json!({"id": "s1", "data": "not a date", "umidade": 1}),
            json!({"id": "s1", "data": "2020-01-01T00:00:10", "umidade": null}),
            json!({"id": "s1", "data": "2020-01-01T00:00:10", "umidade": "wet"}),
        ];

        let readings = decode_rows(rows, "umidade");

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].id, "s1");
        assert_eq!(readings[0].value, 55.5);
        assert_eq!(readings[1].id, "7");
        assert_eq!(readings[1].value, 60.0);
    }

    #[test]
    fn test_decode_row_errors() {
        assert_eq!(
            decode_row(&json!({"data": "2020-01-01", "x": 1}), "x"),
            Err(AlignmentError::MissingField("id".to_string()))
        );
        assert_eq!(
            decode_row(&json!({"id": "a", "data": 3, "x": 1}), "x"),
            Err(AlignmentError::InvalidTimestamp("3".to_string()))
        );
        assert_eq!(
            decode_row(&json!({"id": "a", "data": "2020-01-01", "x": true}), "x"),
            Err(AlignmentError::InvalidValue("x".to_string()))
        );
    }

    #[tokio::test]
    async fn test_fetch_readings_from_api() {
        let router = Router::new().route(
            "/temperatura",
            get(|| async {
                Json(json!([
                    {"id": "A", "data": "2020-01-01T00:00:00", "temperatura": 21.5},
                    {"id": "B", "data": "2020-01-01T00:00:05", "temperatura": 22.0},
                    {"id": "B", "data": "garbage", "temperatura": 22.0}
                ]))
            }),
        );
        let repo = repository(serve(router).await);

        let readings = repo.fetch_readings(Metric::Temperature).await.unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].id, "B");
        assert_eq!(readings[1].timeline_key(), "01-01-2020 00:00:05");
    }

    #[tokio::test]
    async fn test_fetch_readings_status_error() {
        let router = Router::new().route(
            "/pressao",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let repo = repository(serve(router).await);

        let err = repo.fetch_readings(Metric::Pressure).await.unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_readings_rejects_non_array_body() {
        let router = Router::new().route(
            "/umidade",
            get(|| async { Json(json!({"error": "nope"})) }),
        );
        let repo = repository(serve(router).await);

        let err = repo.fetch_readings(Metric::Humidity).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn test_build_url_trims_slashes() {
        let repo = repository("http://example.test/api/".to_string());
        let url = repo.build_url(&MetricSettings::defaults_for(Metric::Humidity));
        assert_eq!(url, "http://example.test/api/umidade");
    }
}
