//! End-to-end pipeline tests: record -> points -> lines -> sink

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use httpmock::prelude::*;
use serde_json::json;

use telebridge_server::api::JsonService;
use telebridge_server::api::proto::json_client::JsonClient;
use telebridge_server::api::proto::json_request::Selector;
use telebridge_server::api::proto::JsonRequest;
use telebridge_server::api::TelemetryGrpcServer;
use telebridge_server::core::config::{AppConfig, ServerConfig, SinkConfig, SinkKind};
use telebridge_server::core::ShutdownService;
use telebridge_server::data::sink::{HttpSink, SinkService};
use telebridge_server::domain::metrics::line_protocol::{encode, encode_batch};
use telebridge_server::domain::telemetry::schema::IFM_DATA_KEY;
use telebridge_server::domain::telemetry::{HierarchicalPath, PathElement, flatten, resolve_path};
use telebridge_server::domain::{
    FieldSet, FieldValue, TagSet, TelemetryAdapter, TelemetryError, TelemetryRecord,
};

const T: i64 = 1_700_000_000_000_000_000;

fn http_sink(server: &MockServer) -> SinkService {
    SinkService::from_sink(Arc::new(
        HttpSink::new(&server.base_url(), Duration::from_secs(5)).unwrap(),
    ))
}

#[test]
fn test_resolve_path_is_deterministic() {
    let path = HierarchicalPath::new(vec![
        PathElement::new("ifm"),
        PathElement::new("interface")
            .with_key("port-name", "eth0")
            .with_key("if-index", "3"),
    ]);

    let mut first_tags = TagSet::new();
    let mut second_tags = TagSet::new();
    let first = resolve_path(&path, "", &mut first_tags).unwrap();
    let second = resolve_path(&path, "", &mut second_tags).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_tags, second_tags);
}

#[test]
fn test_resolve_path_collision_uses_element_prefix() {
    let path = HierarchicalPath::new(vec![
        PathElement::new("a").with_key("name", "x"),
        PathElement::new("b").with_key("name", "y"),
    ]);
    let mut tags = TagSet::new();
    resolve_path(&path, "", &mut tags).unwrap();

    assert_eq!(tags.get("name").map(String::as_str), Some("x"));
    assert_eq!(tags.get("b_name").map(String::as_str), Some("y"));
}

#[test]
fn test_flatten_properties() {
    let fields = flatten("root", &json!({"a": 1}), false);
    assert_eq!(fields.get("root.a"), Some(&FieldValue::SignedInt64(1)));

    let fields = flatten("root", &json!({"a": "2"}), true);
    assert_eq!(fields.get("root.a"), Some(&FieldValue::SignedInt64(2)));

    let fields = flatten("root", &json!({"a": "2"}), false);
    assert_eq!(fields.get("root.a"), Some(&FieldValue::Text("2".into())));
}

#[test]
fn test_encode_properties() {
    let one = |v: FieldValue| -> FieldSet { [("x", v)].into_iter().collect() };
    let empty = TagSet::new();

    assert_eq!(
        encode("m", &empty, &one(FieldValue::SignedInt64(5)), T).unwrap(),
        format!("m x=5i {}", T)
    );
    assert_eq!(
        encode("m", &empty, &one(FieldValue::UnsignedInt64(5)), T).unwrap(),
        format!("m x=5u {}", T)
    );
    assert_eq!(
        encode("m", &empty, &one(FieldValue::Float64(1.5)), T).unwrap(),
        format!("m x=1.5 {}", T)
    );
    assert_eq!(
        encode("m", &empty, &one(FieldValue::Bool(true)), T).unwrap(),
        format!("m x=true {}", T)
    );
    assert_eq!(
        encode("m", &empty, &one(FieldValue::Text("a b".into())), T).unwrap(),
        format!("m x=\"a b\" {}", T)
    );

    let tags: TagSet = [("a,b".to_string(), "c d".to_string())].into_iter().collect();
    let line = encode("m", &tags, &one(FieldValue::SignedInt64(1)), T).unwrap();
    assert!(line.starts_with(r"m,a\,b=c\ d x=1i"));

    let err = encode("m", &empty, &FieldSet::new(), T).unwrap_err();
    assert!(matches!(err, TelemetryError::EmptyFields { .. }));
}

#[test]
fn test_adapter_to_lines() {
    let adapter = TelemetryAdapter::default();
    let record = TelemetryRecord::SensorPath {
        path: "openconfig:/interfaces/interface[name=Ethernet1/1]/state/counters".into(),
        body: Bytes::from_static(br#"{"in-pkts": 42, "oper-status": "UP", "rate": 1.5}"#),
    };

    let points = adapter.ingest(&record, T).unwrap();
    let lines = encode_batch(&points).unwrap();

    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0],
        format!(
            "INTERFACESINTERFACESTATECOUNTERS,name=Ethernet1/1 \
             INTERFACESINTERFACESTATECOUNTERS.in-pkts=42i,\
             INTERFACESINTERFACESTATECOUNTERS.oper-status=\"UP\",\
             INTERFACESINTERFACESTATECOUNTERS.rate=1.5 {}",
            T
        )
    );
}

#[tokio::test]
async fn test_service_delivers_to_http_sink() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/write")
                .body_includes("ifm_interface,ifx=7,port_name=eth7 outp_drop_pkts=3i,");
            then.status(204);
        })
        .await;

    let service = JsonService::new(
        TelemetryAdapter::default(),
        http_sink(&server),
        ShutdownService::new(),
        0,
    );
    let record = TelemetryRecord::Event {
        key: IFM_DATA_KEY,
        body: Bytes::from_static(
            br#"{"timestamp": 0, "data": [{"ifx": 7, "port_name": "eth7", "outp_drop_pkts": 3}]}"#,
        ),
    };

    assert_eq!(service.process(record).await.unwrap(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_reports_sink_rejection() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/write");
            then.status(500).body("database not found");
        })
        .await;

    let service = JsonService::new(
        TelemetryAdapter::default(),
        http_sink(&server),
        ShutdownService::new(),
        0,
    );
    let record = TelemetryRecord::SensorPath {
        path: "/sys".into(),
        body: Bytes::from_static(br#"{"cpu": 12}"#),
    };

    let status = service.process(record).await.unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unavailable);
    assert!(status.message().contains("database not found"));
}

#[tokio::test]
async fn test_grpc_round_trip() {
    let sink_server = MockServer::start_async().await;
    let mock = sink_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/write")
                .body_includes("SYSTEMCPU,slot=1 SYSTEMCPU.util=37i ");
            then.status(204);
        })
        .await;

    // Reserve an ephemeral port, then hand it to the server
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port,
        },
        sink: SinkConfig {
            kind: SinkKind::Http,
            url: sink_server.base_url(),
            timeout_secs: 5,
        },
        telemetry: Default::default(),
    };
    let shutdown = ShutdownService::new();
    let sink = SinkService::init(&config.sink).unwrap();
    let grpc = TelemetryGrpcServer::new(&config, sink, shutdown.clone()).unwrap();
    let handle = tokio::spawn(grpc.start(shutdown.subscribe()));

    let endpoint = format!("http://127.0.0.1:{}", port);
    let mut client = None;
    for _ in 0..50 {
        if let Ok(c) = JsonClient::connect(endpoint.clone()).await {
            client = Some(c);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let mut client = client.expect("gRPC server did not come up");

    let reply = client
        .json_send(JsonRequest {
            device_info: b"core-sw".to_vec(),
            selector: Some(Selector::SensorPath("/system/cpu[slot=1]".into())),
            json_string: r#"{"util": 37}"#.into(),
        })
        .await
        .unwrap();
    assert_eq!(reply.into_inner().ret, 1);
    mock.assert_async().await;

    let status = client
        .json_send(JsonRequest {
            device_info: Vec::new(),
            selector: Some(Selector::SensorPath("/system".into())),
            json_string: "not json".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
