use super::*;
use crate::Credentials;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use url::Url;

const QUERIES_PATH: &str = "/projects/test-project/queries";

fn reader(server: &ServerGuard) -> ProcedureReader {
    let url = Url::parse(&server.url()).unwrap();
    let client =
        BigQueryClient::new(url, "test-project".to_owned(), Credentials::from_token("token"));
    ProcedureReader::new(client, DEFAULT_DATASET.to_owned())
}

fn count_body(count: Option<u64>) -> String {
    let rows = count.map_or_else(Vec::new, |c| vec![json!({"f": [{"v": c.to_string()}]})]);
    let total_rows = rows.len().to_string();
    json!({
        "jobComplete": true,
        "schema": {"fields": [{"name": "count", "type": "INTEGER", "mode": "NULLABLE"}]},
        "rows": rows,
        "totalRows": total_rows
    })
    .to_string()
}

async fn mock_count(server: &mut ServerGuard, body: Matcher, count: Option<u64>) -> Mock {
    server
        .mock("POST", QUERIES_PATH)
        .match_body(body)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(count_body(count))
        .create_async()
        .await
}

#[test]
fn total_count_query_is_fixed() {
    let server_url = Url::parse("http://127.0.0.1:1").unwrap();
    let client = BigQueryClient::new(server_url, "p".to_owned(), Credentials::from_token("t"));
    let reader = ProcedureReader::new(client, DEFAULT_DATASET.to_owned());

    let first = reader.total_count_query();
    let second = reader.total_count_query();
    assert_eq!(first, second);
    assert_eq!(
        first.query,
        "SELECT COUNT(*) AS count FROM \
         `bigquery-public-data.cms_synthetic_patient_data_omop.procedure_occurrence`"
    );
    assert!(first.query_parameters.is_empty());
}

#[test]
fn person_count_query_binds_window() {
    let server_url = Url::parse("http://127.0.0.1:1").unwrap();
    let client = BigQueryClient::new(server_url, "p".to_owned(), Credentials::from_token("t"));
    let reader = ProcedureReader::new(client, "other-project.omop".to_owned());

    let request = reader.person_count_query(1234);
    assert!(request.query.contains("LIMIT @last_n_dates"));
    assert!(request.query.contains("`other-project.omop.procedure_occurrence`"));
    assert!(!request.query.contains("1234"));
    assert_eq!(request.parameter("last_n_dates").map(QueryParameter::value), Some("1234"));
    assert_eq!(request.parameter_mode.as_deref(), Some("NAMED"));
}

#[tokio::test]
async fn total_count_returns_row_value() {
    for count in [0, 1, 37_842_121] {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_count(
            &mut server,
            Matcher::PartialJson(json!({"useLegacySql": false})),
            Some(count),
        )
        .await;

        let got = reader(&server).get_total_procedure_count().await.unwrap();
        assert_eq!(got, Some(count));
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn total_count_without_rows_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_count(&mut server, Matcher::Any, None).await;

    let got = reader(&server).get_total_procedure_count().await.unwrap();
    assert_eq!(got, None);
}

#[tokio::test]
async fn person_count_sends_window_parameter() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_count(
        &mut server,
        Matcher::PartialJson(json!({
            "parameterMode": "NAMED",
            "queryParameters": [{
                "name": "last_n_dates",
                "parameterType": {"type": "INT64"},
                "parameterValue": {"value": "7"}
            }]
        })),
        Some(42),
    )
    .await;

    let got = reader(&server).get_person_count_for_recent_dates(7).await.unwrap();
    assert_eq!(got, Some(42));
    mock.assert_async().await;
}

#[tokio::test]
async fn person_count_without_rows_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_count(&mut server, Matcher::Any, None).await;

    let got = reader(&server).get_person_count_for_recent_dates(0).await.unwrap();
    assert_eq!(got, None);
}

#[tokio::test]
async fn engine_error_is_propagated() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", QUERIES_PATH)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"error": {"code": 403, "message": "Access Denied", "status": "PERMISSION_DENIED"}})
                .to_string(),
        )
        .create_async()
        .await;

    let err = reader(&server).get_total_procedure_count().await.unwrap_err();
    assert!(err.to_string().contains("Access Denied"));
}
