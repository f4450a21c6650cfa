use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;

use serde_json::{Value, json};

use crate::model::{AnnotationRecord, FileKind, ViewerConfigs};
use crate::runtime::{AppContext, ClientSettings, Settings};
use crate::session::ConfigSink;

use super::{ApiClient, ApiResponse, ClientError, Route, dispatch};

fn context() -> AppContext {
    AppContext::in_memory(Settings::default()).expect("default settings are valid")
}

// Answers `requests` HTTP requests by dispatching them against `context`.
fn serve(context: AppContext, requests: usize) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let address = listener.local_addr().expect("local address");
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..requests {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut parts = request_line.split_whitespace();
            let method = parts.next().expect("method").to_string();
            let path = parts.next().expect("path").to_string();

            let mut content_length = 0usize;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).expect("header line");
                if header.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("content length");
                    }
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).expect("request body");
            let body = String::from_utf8(body).expect("utf-8 body");

            let reply = dispatch(&context, &method, &path, Some(&body));
            let payload = reply.body.to_string();
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                reply.status,
                if reply.is_success() { "OK" } else { "Error" },
                payload.len(),
            );
            stream.write_all(response.as_bytes()).expect("write response");
            seen.push(format!("{method} {path}"));
        }
        seen
    });
    (format!("http://{address}"), handle)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&ClientSettings {
        base_url: base_url.to_string(),
        timeout_ms: 5_000,
    })
}

#[test]
fn routes_round_trip_through_their_paths() {
    let routes = [
        Route::Health,
        Route::PatientFiles {
            patient_id: "P001".to_string(),
        },
        Route::ViewerData {
            kind: FileKind::Volume,
            id: "d3d".to_string(),
        },
        Route::UpdateConfig {
            kind: FileKind::Image,
            id: "painting".to_string(),
        },
    ];
    for route in routes {
        assert_eq!(Route::parse(route.method(), &route.path()), Some(route));
    }
    assert_eq!(
        Route::parse("get", "/api/dicom/stack/h1/?verbose=1"),
        Some(Route::ViewerData {
            kind: FileKind::Stack,
            id: "h1".to_string()
        })
    );
    assert_eq!(Route::parse("GET", "/api/dicom/image/painting"), None);
    assert_eq!(Route::parse("POST", "/api/image/painting/config"), None);
}

#[test]
fn patient_route_wraps_the_catalog() {
    let context = context();
    let reply = dispatch(&context, "GET", "/api/patient/P001/files", None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["success"], json!(true));
    assert_eq!(reply.body["message"], json!("Patient data fetched successfully"));
    assert_eq!(reply.body["data"]["patientName"], json!("John Doe"));
    assert_eq!(reply.body["data"]["files"][1]["type"], json!("volume"));

    let missing = dispatch(&context, "GET", "/api/patient/P404/files", None);
    assert_eq!(missing.status, 404);
    assert_eq!(
        missing.body,
        json!({"success": false, "message": "Patient with ID P404 not found"})
    );
}

#[test]
fn viewer_routes_return_records_with_defaults() {
    let context = context();
    let reply = dispatch(&context, "GET", "/api/dicom/volume/d3d", None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["message"], json!("Volume data fetched successfully"));
    let data = &reply.body["data"];
    assert_eq!(data["id"], json!("d3d"));
    assert_eq!(data["viewer"]["configs"], json!({"shift": 400.0, "annotations": []}));
    assert_eq!(
        data["viewer"]["imageUrl"].as_array().map(Vec::len),
        Some(291)
    );
    assert!(data["createdAt"].is_string());

    let image = dispatch(&context, "GET", "/api/image/painting", None);
    assert_eq!(
        image.body["data"]["viewer"]["imageUrl"],
        json!("http://127.0.0.1:8000/files/painting.jpg")
    );

    let missing = dispatch(&context, "GET", "/api/dicom/stack/ghost", None);
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body["message"], json!("File with ID ghost not found"));

    let wrong_kind = dispatch(&context, "GET", "/api/dicom/stack/d3d", None);
    assert_eq!(wrong_kind.status, 404);
    assert_eq!(wrong_kind.body["success"], json!(false));
}

#[test]
fn not_found_lookups_create_no_records() {
    let context = context();
    for path in [
        "/api/dicom/stack/ghost",
        "/api/dicom/volume/ghost",
        "/api/image/ghost",
        "/api/dicom/stack/d3d",
        "/api/dicom/volume/painting",
        "/api/image/h1",
    ] {
        assert_eq!(dispatch(&context, "GET", path, None).status, 404, "{path}");
    }
    for kind in FileKind::ALL {
        assert_eq!(context.backend().count(kind).expect("count"), 0, "{kind}");
    }
}

#[test]
fn encoded_path_segments_are_decoded() {
    let context = context();
    let reply = dispatch(&context, "GET", "/api/dicom/stack/h%31", None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["data"]["id"], json!("h1"));

    let route = Route::ViewerData {
        kind: FileKind::Image,
        id: "scan 7?a/b".to_string(),
    };
    assert_eq!(route.path(), "/api/image/scan%207%3Fa%2Fb");
    assert_eq!(Route::parse("GET", &route.path()), Some(route));
}

#[test]
fn image_replace_treats_null_fields_as_absent() {
    let context = context();
    let reply = dispatch(
        &context,
        "PATCH",
        "/api/image/painting/config",
        Some(r#"{"contrast": 4, "gammaR": null, "annotations": null}"#),
    );
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["data"], json!({"contrast": 4.0}));
}

#[test]
fn patch_routes_merge_or_replace_by_kind() {
    let context = context();
    dispatch(&context, "PATCH", "/api/dicom/stack/h1/config", Some(r#"{"contrast": 30}"#));
    let merged = dispatch(
        &context,
        "PATCH",
        "/api/dicom/stack/h1/config",
        Some(r#"{"brightness": 5, "isInverted": null}"#),
    );
    assert_eq!(merged.status, 200);
    assert_eq!(merged.body["message"], json!("Stack viewer settings saved successfully"));
    assert_eq!(merged.body["data"], json!({"contrast": 30.0, "brightness": 5.0}));

    dispatch(&context, "PATCH", "/api/image/painting/config", Some(r#"{"sharpness": 70}"#));
    let replaced = dispatch(
        &context,
        "PATCH",
        "/api/image/painting/config",
        Some(r#"{"contrast": 2}"#),
    );
    assert_eq!(replaced.body["data"], json!({"contrast": 2.0}));
}

#[test]
fn bad_patch_bodies_are_rejected_without_detail_leaks() {
    let context = context();
    let not_json = dispatch(&context, "PATCH", "/api/dicom/volume/d3d/config", Some("{shift"));
    assert_eq!(not_json.status, 400);
    assert_eq!(not_json.body["message"], json!("Error updating volume config"));

    let wrong_shape = dispatch(
        &context,
        "PATCH",
        "/api/dicom/volume/d3d/config",
        Some(r#"{"shift": "far"}"#),
    );
    assert_eq!(wrong_shape.status, 400);
    let detail = wrong_shape.body["error"].as_str().expect("short reason");
    assert!(detail.starts_with("volume configuration"), "{detail}");

    let empty = dispatch(&context, "PATCH", "/api/dicom/volume/d3d/config", Some("  "));
    assert_eq!(empty.status, 200);
    assert_eq!(empty.body["data"], json!({}));
}

#[test]
fn health_reports_the_storage_backend() {
    let reply = dispatch(&context(), "GET", "/health", None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["status"], json!("OK"));
    assert_eq!(
        reply.body["database"],
        json!({"connected": false, "type": "In-Memory"})
    );

    let unknown = dispatch(&context(), "GET", "/api/nothing", None);
    assert_eq!(unknown.status, 404);
}

#[test]
fn envelopes_omit_absent_fields() {
    let ok = serde_json::to_value(ApiResponse::ok("done", 3)).expect("serialize");
    assert_eq!(ok, json!({"success": true, "message": "done", "data": 3}));

    let failed: ApiResponse<Value> = serde_json::from_value(json!({
        "success": false,
        "message": "Error updating image config",
        "error": "persistence failure"
    }))
    .expect("deserialize");
    assert_eq!(failed.data, None);
    assert_eq!(failed.error.as_deref(), Some("persistence failure"));
}

#[test]
fn client_error_retry_classification() {
    let transport = ClientError::Transport {
        url: "http://127.0.0.1:1/health".to_string(),
        message: "connection refused".to_string(),
    };
    assert!(transport.is_retriable());
    let server = ClientError::Status {
        code: 503,
        message: "busy".to_string(),
    };
    assert!(server.is_retriable());
    let missing = ClientError::Status {
        code: 404,
        message: "File with ID x not found".to_string(),
    };
    assert!(!missing.is_retriable());
    assert!(!ClientError::Decode("garbage".to_string()).is_retriable());
}

#[test]
fn client_talks_to_a_live_server() {
    let server_context = context();
    let (base_url, handle) = serve(server_context.clone(), 4);
    let client = client(&base_url);

    let health = client.health().expect("health");
    assert_eq!(health.status, "OK");

    let record = client
        .viewer_data(FileKind::Stack, "h1")
        .expect("stack record");
    assert_eq!(record.kind(), FileKind::Stack);

    let configs = ViewerConfigs::from_value(
        FileKind::Stack,
        json!({"contrast": 9, "annotations": [{"annotationUID": "u1", "toolName": "Length"}]}),
    )
    .expect("payload");
    let stored = client.save_configs("h1", configs).expect("save");
    assert_eq!(stored.annotations(), [AnnotationRecord::new("u1", "Length")]);

    let error = client
        .viewer_data(FileKind::Image, "ghost")
        .expect_err("unknown file");
    assert!(matches!(error, ClientError::Status { code: 404, .. }));
    assert!(!error.is_retriable());

    let seen = handle.join().expect("server thread");
    assert_eq!(
        seen,
        vec![
            "GET /health",
            "GET /api/dicom/stack/h1",
            "PATCH /api/dicom/stack/h1/config",
            "GET /api/image/ghost",
        ]
    );
    assert_eq!(
        server_context
            .viewer_service()
            .store()
            .find(FileKind::Stack, "h1")
            .expect("lookup")
            .expect("stored")
            .configs()
            .annotations()
            .len(),
        1
    );
}

#[test]
fn unreachable_server_is_a_retriable_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);

    let error = client(&format!("http://{address}"))
        .health()
        .expect_err("nothing listening");
    assert!(matches!(error, ClientError::Transport { .. }));
    assert!(error.is_retriable());
}
