//! Catalog sinks against a stub ingest endpoint and a temp directory.

use portico_catalog::{
    CatalogConnection, CatalogError, EntityMutationBuilder, FileCatalogConnection,
    HttpCatalogConnection, OwnershipNames,
};
use portico_core::{ApiVersionRecord, MutationBatch};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn batch(ids: &[&str]) -> MutationBatch {
    let builder = EntityMutationBuilder::new(
        OwnershipNames::default(),
        "portico-provider:test",
        "http://portal/v1",
    );
    let records: Vec<ApiVersionRecord> = ids.iter().map(|id| ApiVersionRecord::new(*id)).collect();
    builder.build(&records)
}

#[tokio::test]
async fn http_sink_posts_full_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(body_partial_json(serde_json::json!({"type": "full"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let sink = HttpCatalogConnection::new(reqwest::Client::new(), &format!("{}/ingest", server.uri()));
    sink.apply_mutation(batch(&["petstore"])).await.unwrap();
}

#[tokio::test]
async fn http_sink_surfaces_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
        .mount(&server)
        .await;

    let sink = HttpCatalogConnection::new(reqwest::Client::new(), &server.uri());
    let err = sink.apply_mutation(batch(&[])).await.unwrap_err();
    match err {
        CatalogError::Rejected { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "conflict");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn file_sink_replaces_previous_batch() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("catalog.json");
    let sink = FileCatalogConnection::new(&target);

    sink.apply_mutation(batch(&["first", "second"])).await.unwrap();
    sink.apply_mutation(batch(&["third"])).await.unwrap();

    let written: MutationBatch =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(written, batch(&["third"]));
    assert!(!dir.path().join("nested").join("catalog.json.tmp").exists());
}

#[test]
fn built_batches_match_the_published_schema() {
    let schema = serde_json::to_value(schemars::schema_for!(MutationBatch)).unwrap();
    let validator = jsonschema::validator_for(&schema).unwrap();
    let instance = serde_json::to_value(batch(&["petstore", "tracks v2"])).unwrap();
    assert!(validator.is_valid(&instance));
}
