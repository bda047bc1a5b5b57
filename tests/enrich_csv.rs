use rowembed_lib::config::{AppConfig, EmbeddingConfig, PipelineConfig};
use rowembed_lib::errors::EmbedError;
use rowembed_lib::pipeline::Dataset;
use rowembed_lib::run_with_config;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_config(server: &MockServer, dir: &std::path::Path, api_key: Option<&str>) -> AppConfig {
    AppConfig {
        embedding: EmbeddingConfig {
            api_base: format!("{}/v1", server.uri()),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
            ..EmbeddingConfig::default()
        },
        pipeline: PipelineConfig {
            input_path: dir.join("fruit_data.csv"),
            output_path: dir.join("result.csv"),
            ..PipelineConfig::default()
        },
    }
}

async fn mount_vector(server: &MockServer, text: &str, vector: &[f64]) {
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "input": text })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{ "object": "embedding", "index": 0, "embedding": vector }],
            "model": "text-embedding-3-small"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fruit_rows_are_enriched() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = app_config(&server, dir.path(), Some("test-key"));
    std::fs::write(
        &config.pipeline.input_path,
        "id,text\n1,\"apple\"\n2,\"banana\"\n",
    )
    .unwrap();
    mount_vector(&server, "apple", &[0.125, -0.5, 0.75]).await;
    mount_vector(&server, "banana", &[0.5, 0.25, -1.0]).await;

    let summary = run_with_config(&config).await.unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.dimensions, 3);

    let output = std::fs::read(&config.pipeline.output_path).unwrap();
    let dataset = Dataset::from_csv_reader(output.as_slice(), b',').unwrap();
    assert_eq!(dataset.headers(), ["id", "text", "ada_embedding"]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.get(0, "id"), Some("1"));
    assert_eq!(dataset.get(0, "text"), Some("apple"));
    assert_eq!(dataset.get(0, "ada_embedding"), Some("[0.125,-0.5,0.75]"));
    assert_eq!(dataset.get(1, "id"), Some("2"));
    assert_eq!(dataset.get(1, "text"), Some("banana"));
    assert_eq!(dataset.get(1, "ada_embedding"), Some("[0.5,0.25,-1.0]"));

    let requests = server.received_requests().await.unwrap();
    let inputs: Vec<String> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["input"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(inputs, vec!["apple", "banana"]);
}

#[tokio::test]
async fn test_missing_credential_produces_no_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = app_config(&server, dir.path(), None);
    std::fs::write(&config.pipeline.input_path, "id,text\n1,apple\n").unwrap();

    let result = run_with_config(&config).await;
    assert!(matches!(result, Err(EmbedError::RemoteCall(_))));
    assert!(!config.pipeline.output_path.exists());
}

#[tokio::test]
async fn test_service_error_midway_produces_no_output() {
    let server = MockServer::start().await;
    mount_vector(&server, "apple", &[0.5]).await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "input": "banana" })))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = app_config(&server, dir.path(), Some("test-key"));
    std::fs::write(
        &config.pipeline.input_path,
        "id,text\n1,apple\n2,banana\n3,cherry\n",
    )
    .unwrap();

    match run_with_config(&config).await {
        Err(EmbedError::RemoteCall(msg)) => assert!(msg.contains("503")),
        other => panic!("expected RemoteCall error, got {:?}", other),
    }
    assert!(!config.pipeline.output_path.exists());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
