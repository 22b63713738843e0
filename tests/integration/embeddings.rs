use llmclient::client::Client;
use llmclient::types::embeddings::EmbeddingsRequest;
use llmclient::types::Limits;

use crate::fake_transport::FakeTransport;

#[test]
fn rejects_too_many_inputs_at_client_level() {
    let transport = FakeTransport::new();
    let mut client = Client::new(transport, "https://api.example.com", "sk-test")
        .with_limits(Limits { max_embedding_inputs: 4, ..Limits::default() });

    let inputs: Vec<String> = (0..5).map(|i| i.to_string()).collect();
    let request = EmbeddingsRequest::builder().model("embed-v1").input(inputs).build().unwrap();

    let err = client.embeddings(&request).unwrap_err();
    assert_eq!(err.stage(), llmclient::error::Stage::Protocol);
}

#[test]
fn zero_cap_allows_any_input_count() {
    let mut transport = FakeTransport::new();
    transport.push_json(
        200,
        r#"{"model":"embed-v1","data":[{"index":0,"embedding":[0.1,0.2]}]}"#,
    );
    let mut client = Client::new(transport, "https://api.example.com", "sk-test")
        .with_limits(Limits { max_embedding_inputs: 0, max_embedding_input_bytes: 0, ..Limits::default() });

    let inputs: Vec<String> = (0..10_000).map(|i| i.to_string()).collect();
    let request = EmbeddingsRequest::builder().model("embed-v1").input(inputs).build().unwrap();

    assert!(client.embeddings(&request).is_ok());
}
