
use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tether::constants;
use tether::{
    ApiClient, ApiDeclaration, ApiMetadata, AttributeValue, CallArg, CallOutput, CancelController,
    EndpointMetadata, Error, Exchange, ExchangeOptions, ExtractorRef, HttpResponse, ParameterMap,
    RequestDescriptor, ResolvedCallMetadata, ReturnShape, Transport, TransportRegistry,
};
use test_helpers::{users_api, RecordingTransport};

mock! {
    pub Wire {}

    #[async_trait]
    impl Transport for Wire {
        async fn exchange(
            &self,
            request: RequestDescriptor,
            options: ExchangeOptions,
        ) -> Result<Exchange, Error>;
    }
}

fn client_with(transport: impl Transport + 'static) -> ApiClient {
    ApiClient::builder(users_api())
        .transport(transport)
        .build()
        .expect("client")
}

#[tokio::test]
async fn test_get_user_end_to_end() {
    let transport = RecordingTransport::json(&json!({"id": "42", "name": "Ada"}));
    let client = client_with(transport.clone());

    let output = client
        .call("get_user", vec!["42".into()])
        .await
        .expect("call succeeds");
    assert_eq!(
        output.into_result(),
        Some(json!({"id": "42", "name": "Ada"}))
    );

    let request = transport.last().request;
    assert_eq!(request.method, reqwest::Method::GET);
    assert_eq!(request.url, "/api/v1/users/42");
    assert_eq!(request.headers.get("X-API").map(String::as_str), Some("a"));
    assert_eq!(request.headers.get("X-EP").map(String::as_str), Some("b"));
    assert_eq!(request.timeout, Some(Duration::from_millis(3000)));
    assert_eq!(request.url_params.path.get("id"), Some(&json!("42")));
    assert!(request.url_params.query.is_empty());
}

#[tokio::test]
async fn test_call_json_deserializes_result() {
    #[derive(serde::Deserialize)]
    struct User {
        id: String,
        name: String,
    }

    let client = client_with(RecordingTransport::json(&json!({"id": "7", "name": "Lin"})));
    let user: User = client
        .call_json("get_user", vec!["7".into()])
        .await
        .expect("typed result");
    assert_eq!(user.id, "7");
    assert_eq!(user.name, "Lin");
}

#[tokio::test]
async fn test_diagnostic_attributes_overwrite_caller_keys() {
    let transport = RecordingTransport::json(&json!([]));
    let client = client_with(transport.clone());

    let mut spoofed = serde_json::Map::new();
    spoofed.insert(constants::ATTR_CLIENT.to_string(), json!("spoofed"));
    spoofed.insert(constants::ATTR_CALL_METADATA.to_string(), json!("spoofed"));
    spoofed.insert("page_hint".to_string(), json!(3));

    client
        .call(
            "search",
            vec![
                "ada".into(),
                CallArg::Absent,
                Value::Object(spoofed).into(),
            ],
        )
        .await
        .expect("call succeeds");

    let recorded = transport.last();
    assert!(recorded.attribute_keys.iter().any(|k| k == constants::ATTR_CLIENT));
    assert!(recorded.attribute_keys.iter().any(|k| k == constants::ATTR_CALL_METADATA));
    // Both keys now hold handles rather than the caller's JSON.
    assert!(!recorded.attributes.contains_key(constants::ATTR_CLIENT));
    assert!(!recorded.attributes.contains_key(constants::ATTR_CALL_METADATA));
    assert_eq!(recorded.attributes.get("page_hint"), Some(&json!(3)));
    assert_eq!(recorded.attributes.get("tenant"), Some(&json!("acme")));
    assert_eq!(recorded.request.url_params.query.get("q"), Some(&json!("ada")));
    assert!(!recorded.request.headers.contains_key("X-Trace"));
}

#[tokio::test]
async fn test_extractor_sees_client_and_cached_metadata() {
    let seen: Arc<Mutex<Vec<Arc<ResolvedCallMetadata>>>> = Arc::new(Mutex::new(Vec::new()));
    let clients: Arc<Mutex<Vec<ApiClient>>> = Arc::new(Mutex::new(Vec::new()));
    let (seen_in, clients_in) = (Arc::clone(&seen), Arc::clone(&clients));

    let extractor = ExtractorRef::from_fn("diagnostics", move |exchange: &Exchange| {
        let attributes = exchange.attributes();
        let metadata = attributes
            .get(constants::ATTR_CALL_METADATA)
            .and_then(AttributeValue::as_metadata)
            .ok_or_else(|| anyhow::anyhow!("no metadata attribute"))?;
        let client = attributes
            .get(constants::ATTR_CLIENT)
            .and_then(AttributeValue::as_client)
            .ok_or_else(|| anyhow::anyhow!("no client attribute"))?;
        seen_in.lock().expect("lock").push(Arc::clone(metadata));
        clients_in.lock().expect("lock").push(client.clone());
        Ok(Value::String(metadata.method_name().to_string()))
    });

    let declaration = ApiDeclaration::builder("diag")
        .api(ApiMetadata::new().with_result_extractor(extractor))
        .endpoint("ping", EndpointMetadata::get("/ping"), ParameterMap::new())
        .build();
    let client = ApiClient::builder(declaration)
        .transport(RecordingTransport::json(&json!({})))
        .build()
        .expect("client");

    for _ in 0..2 {
        let output = client.call("ping", vec![]).await.expect("call succeeds");
        assert_eq!(output.into_result(), Some(json!("ping")));
    }

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    assert!(Arc::ptr_eq(&seen[0], &seen[1]));
    let executor = client.executor("ping").expect("executor");
    assert!(Arc::ptr_eq(&seen[0], executor.metadata()));

    let clients = clients.lock().expect("lock");
    assert!(clients.iter().all(|c| c.ptr_eq(&client)));
}

#[tokio::test]
async fn test_executor_built_once_per_method_per_client() {
    let client = client_with(RecordingTransport::json(&json!({})));
    let first = client.executor("get_user").expect("executor");
    client
        .call("get_user", vec!["1".into()])
        .await
        .expect("call succeeds");
    let second = client.executor("get_user").expect("executor");
    assert!(Arc::ptr_eq(&first, &second));

    let other = client_with(RecordingTransport::json(&json!({})));
    let foreign = other.executor("get_user").expect("executor");
    assert!(!Arc::ptr_eq(&first, &foreign));
}

#[tokio::test]
async fn test_concurrent_first_calls_agree() {
    let transport = RecordingTransport::json(&json!({"ok": true}));
    let client = client_with(transport.clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.call("get_user", vec![i64::from(i).into()]).await
        }));
    }
    for handle in handles {
        let output = handle.await.expect("task").expect("call succeeds");
        assert_eq!(output.into_result(), Some(json!({"ok": true})));
    }
    assert_eq!(transport.calls().len(), 8);

    let a = client.executor("get_user").expect("executor");
    let b = client.executor("get_user").expect("executor");
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_instance_override_replaces_api_wholesale() {
    let transport = RecordingTransport::json(&json!({}));
    let client = ApiClient::builder(users_api())
        .api_override(ApiMetadata::new().with_base_path("/api/v2"))
        .transport(transport.clone())
        .build()
        .expect("client");

    client
        .call("get_user", vec!["42".into()])
        .await
        .expect("call succeeds");

    let recorded = transport.last();
    assert_eq!(recorded.request.url, "/api/v2/users/42");
    assert!(!recorded.request.headers.contains_key("X-API"));
    assert_eq!(recorded.request.headers.get("X-EP").map(String::as_str), Some("b"));
    assert!(!recorded.attributes.contains_key("tenant"));
    assert_eq!(recorded.request.timeout, Some(Duration::from_millis(3000)));
}

#[tokio::test]
async fn test_exchange_return_shape() {
    let declaration = ApiDeclaration::builder("raw")
        .api(ApiMetadata::new().with_return_shape(ReturnShape::Exchange))
        .endpoint("status", EndpointMetadata::get("/status"), ParameterMap::new())
        .endpoint(
            "status_value",
            EndpointMetadata::get("/status").with_return_shape(ReturnShape::Result),
            ParameterMap::new(),
        )
        .build();
    let client = ApiClient::builder(declaration)
        .transport(RecordingTransport::new(
            HttpResponse::new(201, r#"{"up":true}"#).with_header("x-served-by", "edge"),
        ))
        .build()
        .expect("client");

    let output = client.call("status", vec![]).await.expect("call succeeds");
    let CallOutput::Exchange(exchange) = output else {
        panic!("expected the exchange");
    };
    assert_eq!(exchange.request().url, "/status");
    let response = exchange.required_response().expect("response");
    assert_eq!(response.status, 201);
    assert_eq!(response.headers["x-served-by"], "edge");
    assert_eq!(exchange.extract_result().await.expect("json"), json!({"up": true}));

    let value = client.call("status_value", vec![]).await.expect("call succeeds");
    assert_eq!(value.into_result(), Some(json!({"up": true})));

    let err = client
        .call_json::<Value>("status", vec![])
        .await
        .expect_err("exchange shape is not a result");
    assert!(matches!(err, Error::Extraction { .. }));
}

#[tokio::test]
async fn test_misuse_never_reaches_transport() {
    let mut wire = MockWire::new();
    wire.expect_exchange().never();
    let client = client_with(wire);

    let err = client
        .call("search", vec!["q".into(), CallArg::Absent, "not an object".into()])
        .await
        .expect_err("attributes must be an object");
    assert!(matches!(err, Error::AttributesNotObject { position: 2, found: "string" }));
    assert!(err.is_misuse());

    let err = client
        .call("create_user", vec![json!({}).into(), json!([1, 2]).into()])
        .await
        .expect_err("override must be an object");
    assert!(matches!(err, Error::InvalidRequestOverride { position: 1, .. }));

    let err = client
        .call("delete_user", vec![])
        .await
        .expect_err("undeclared method");
    assert!(matches!(err, Error::EndpointNotDeclared { .. }));
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let mut wire = MockWire::new();
    wire.expect_exchange().times(1).returning(|_, _| {
        Err(Error::HttpStatus {
            status: 503,
            body: "down".to_string(),
        })
    });
    let client = client_with(wire);

    let err = client
        .call("get_user", vec!["42".into()])
        .await
        .expect_err("transport failure");
    assert!(matches!(err, Error::HttpStatus { status: 503, ref body } if body == "down"));
    assert!(!err.is_misuse());
}

#[tokio::test]
async fn test_extractor_errors_propagate() {
    let client = client_with(RecordingTransport::new(HttpResponse::new(200, "not json")));
    let err = client
        .call("get_user", vec!["42".into()])
        .await
        .expect_err("body is not JSON");
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn test_request_override_body_and_path() {
    let transport = RecordingTransport::json(&json!({"created": true}));
    let client = client_with(transport.clone());

    client
        .call(
            "create_user",
            vec![
                json!({"name": "Ada"}).into(),
                json!({
                    "path": "/admin/users",
                    "headers": {"X-API": "override"},
                    "urlParams": {"query": {"notify": true}}
                })
                .into(),
            ],
        )
        .await
        .expect("call succeeds");

    let request = transport.last().request;
    assert_eq!(request.method, reqwest::Method::POST);
    assert_eq!(request.url, "/api/v1/admin/users");
    assert_eq!(request.headers.get("X-API").map(String::as_str), Some("override"));
    assert_eq!(request.url_params.query.get("notify"), Some(&json!(true)));
    assert_eq!(request.body, Some(json!({"name": "Ada"})));
    assert_eq!(request.timeout, Some(Duration::from_millis(5000)));
}

#[tokio::test]
async fn test_named_transport_selection() {
    let primary = RecordingTransport::json(&json!("primary"));
    let audit = RecordingTransport::json(&json!("audit"));

    let declaration = ApiDeclaration::builder("multi")
        .endpoint("plain", EndpointMetadata::get("/plain"), ParameterMap::new())
        .endpoint(
            "audited",
            EndpointMetadata::post("/audit").with_transport("audit"),
            ParameterMap::new(),
        )
        .endpoint(
            "lost",
            EndpointMetadata::get("/lost").with_transport("missing"),
            ParameterMap::new(),
        )
        .build();
    let client = ApiClient::builder(declaration)
        .transports(TransportRegistry::new(primary.clone()).with_transport("audit", audit.clone()))
        .build()
        .expect("client");

    let plain = client.call("plain", vec![]).await.expect("call succeeds");
    assert_eq!(plain.into_result(), Some(json!("primary")));
    let audited = client.call("audited", vec![]).await.expect("call succeeds");
    assert_eq!(audited.into_result(), Some(json!("audit")));
    assert_eq!(primary.calls().len(), 1);
    assert_eq!(audit.calls().len(), 1);

    let err = client.call("lost", vec![]).await.expect_err("unknown transport");
    assert!(matches!(err, Error::TransportNotFound { ref name } if name == "missing"));
}

#[tokio::test]
async fn test_cancellation_handles_reach_transport() {
    let transport = RecordingTransport::json(&json!({}));
    let client = client_with(transport.clone());
    let controller = CancelController::new();

    client
        .call(
            "search",
            vec!["ada".into(), controller.clone().into(), json!({}).into()],
        )
        .await
        .expect("call succeeds");

    let request = transport.last().request;
    assert_eq!(request.url_params.query.get("q"), Some(&json!("ada")));
    assert!(!request.headers.contains_key("X-Trace"));
    let signal = request.cancel_signal().expect("signal derived from controller");
    assert!(!signal.is_cancelled());
    controller.cancel();
    assert!(signal.is_cancelled());
}
