//! Encoding properties of request construction.

use proptest::prelude::*;
use spiget_core::{
    Endpoint, HttpRequest, HttpResponse, QueryParams, SpigetClient, Transport, TransportError,
};

struct Unused;

impl Transport for Unused {
    fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::new("not used"))
    }
}

const BASE: &str = "https://api.spiget.org/v2";

fn client() -> SpigetClient<Unused> {
    SpigetClient::new(Unused)
}

/// Parameter strings biased towards characters that could break a path.
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[a-z /?#%&+=.~é世]{0,16}",
    ]
}

proptest! {
    #[test]
    fn path_parameter_round_trips(value in segment()) {
        let req = client()
            .prepare(Endpoint::AuthorDetails, &[value.as_str()], &QueryParams::new())
            .unwrap();
        let encoded = req.url.strip_prefix(&format!("{BASE}/authors/")).unwrap();

        prop_assert!(!encoded.contains('/'));
        prop_assert!(!encoded.contains('?'));
        prop_assert_eq!(urlencoding::decode(encoded).unwrap(), value.as_str());
    }

    #[test]
    fn two_parameters_stay_separate(id in segment(), secret in segment()) {
        let req = client()
            .prepare(Endpoint::DeleteWebhook, &[id.as_str(), secret.as_str()], &QueryParams::new())
            .unwrap();
        let rest = req.url.strip_prefix(&format!("{BASE}/webhook/delete/")).unwrap();
        let parts: Vec<&str> = rest.split('/').collect();

        prop_assert_eq!(parts.len(), 2);
        prop_assert_eq!(urlencoding::decode(parts[0]).unwrap(), id.as_str());
        prop_assert_eq!(urlencoding::decode(parts[1]).unwrap(), secret.as_str());
    }

    #[test]
    fn query_preserves_insertion_order(
        pairs in proptest::collection::vec(("[a-z]{1,6}", any::<String>()), 0..6)
    ) {
        let mut params = QueryParams::new();
        let mut keys: Vec<String> = Vec::new();
        for (key, value) in &pairs {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
            params.set(key.as_str(), value.as_str());
        }

        let req = client().prepare(Endpoint::ResourceList, &[], &params).unwrap();
        if keys.is_empty() {
            prop_assert!(!req.url.contains('?'));
        } else {
            let (_, query) = req.url.split_once('?').unwrap();
            let decoded: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
            let decoded_keys: Vec<String> = decoded.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(&decoded_keys, &keys);
            for (key, value) in &decoded {
                let last = pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone());
                prop_assert_eq!(Some(value.clone()), last);
            }
        }
    }
}
