//! Verify request building and response handling against JSON test vectors
//! stored in `test-vectors/`.
//!
//! `requests.json` describes inputs and the exact request expected on the
//! wire. `responses.json` feeds simulated responses through a canned
//! transport and describes the expected outcome.

use serde_json::Value;
use spiget_core::{
    Endpoint, HttpMethod, HttpRequest, HttpResponse, Payload, QueryParams, QueryValue,
    SpigetClient, SpigetError, Transport, TransportError,
};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_endpoint(case: &Value) -> Endpoint {
    serde_json::from_value(case["endpoint"].clone()).unwrap()
}

fn path_params(case: &Value) -> Vec<String> {
    case["path_params"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap().to_string())
        .collect()
}

fn query_value(v: &Value) -> QueryValue {
    match v {
        Value::String(s) => QueryValue::from(s.as_str()),
        Value::Bool(b) => QueryValue::from(*b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => QueryValue::from(i),
            (None, Some(u)) => QueryValue::from(u),
            _ => QueryValue::from(n.as_f64().unwrap()),
        },
        other => panic!("unsupported query value: {other}"),
    }
}

fn query(case: &Value) -> QueryParams {
    case["query"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), query_value(&pair[1]))
        })
        .collect()
}

/// Answers every request with the same simulated response.
struct Simulated(HttpResponse);

impl Transport for Simulated {
    fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    let client = SpigetClient::new(Simulated(HttpResponse::new(200, "{}")))
        .with_base_url(base_url)
        .with_user_agent(vectors["user_agent"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = parse_endpoint(case);
        let params = path_params(case);
        let params: Vec<&str> = params.iter().map(String::as_str).collect();
        let expected = &case["expected_request"];

        let req = client.prepare(endpoint, &params, &query(case)).unwrap();

        let method = parse_method(expected["method"].as_str().unwrap());
        assert_eq!(req.method, method, "{name}: method");
        let url = format!("{base_url}{}", expected["path"].as_str().unwrap());
        assert_eq!(req.url, url, "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let body = req.body.as_deref().map(|b| std::str::from_utf8(b).unwrap());
        assert_eq!(body, expected["body"].as_str(), "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = parse_endpoint(case);
        let params = path_params(case);
        let params: Vec<&str> = params.iter().map(String::as_str).collect();

        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );
        let client = SpigetClient::new(Simulated(response));
        let result = client.call(endpoint, &params, &QueryParams::new());

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error["kind"].as_str().unwrap() {
                "Communication" => {
                    let code = expected_error["code"].as_u64().map(|c| c as u16);
                    assert_eq!(err.code(), code, "{name}: code");
                    let needle = expected_error["message_contains"].as_str().unwrap();
                    assert!(err.to_string().contains(needle), "{name}: message {err}");
                }
                "Decode" => {
                    assert!(matches!(err, SpigetError::Decode(_)), "{name}: expected Decode")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            continue;
        }

        let payload = result.unwrap();
        let expected = &case["expected_result"];
        if let Some(json) = expected.get("json") {
            assert_eq!(payload, Payload::Json(json.clone()), "{name}: json");
        } else if let Some(raw) = expected.get("raw") {
            let raw = raw.as_str().unwrap().as_bytes().to_vec();
            assert_eq!(payload, Payload::Raw(raw), "{name}: raw");
        } else {
            panic!("{name}: case has no expectation");
        }
    }
}
