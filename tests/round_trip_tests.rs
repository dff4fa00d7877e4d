use argscheme::codec::{ArgScheme, SchemeRegistry};
use argscheme::message::{ResponseBuilder, ResponseCode};
use argscheme::{Headers, MessageError};
use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Priority {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: i64,
    customer: String,
    items: Vec<String>,
    quantities: HashMap<String, i32>,
    note: Option<String>,
    expedite: bool,
    priority: Priority,
}

fn random_string(rng: &mut impl Rng) -> String {
    let len = rng.random_range(0..16);
    Alphanumeric.sample_string(rng, len)
}

fn random_headers(rng: &mut impl Rng) -> Headers {
    (0..rng.random_range(0..8))
        .map(|_| (random_string(rng), random_string(rng)))
        .collect()
}

fn random_order(rng: &mut impl Rng) -> Order {
    let items: Vec<String> = (0..rng.random_range(0..5))
        .map(|_| random_string(rng))
        .collect();
    let quantities = items
        .iter()
        .map(|item| (item.clone(), rng.random_range(1..100)))
        .collect();

    Order {
        id: rng.random(),
        customer: random_string(rng),
        items,
        quantities,
        note: rng.random_bool(0.5).then(|| random_string(rng)),
        expedite: rng.random(),
        priority: if rng.random() {
            Priority::High
        } else {
            Priority::Low
        },
    }
}

#[test]
fn registry_round_trips_random_values() {
    let registry: SchemeRegistry = SchemeRegistry::default();
    let mut rng = rand::rng();

    for scheme in [ArgScheme::Json, ArgScheme::Thrift] {
        for _ in 0..200 {
            let headers = random_headers(&mut rng);
            let arg2 = registry.encode_headers(&headers, scheme).unwrap();
            assert_eq!(registry.decode_headers(&arg2, scheme).unwrap(), headers);

            let order = random_order(&mut rng);
            let arg3 = registry.encode_body(&order, scheme).unwrap();
            let decoded: Order = registry.decode_body(&arg3, scheme).unwrap();
            assert_eq!(decoded, order);
        }
    }
}

#[test]
fn header_encoding_is_deterministic() {
    let registry: SchemeRegistry = SchemeRegistry::default();
    let mut rng = rand::rng();

    for scheme in [ArgScheme::Json, ArgScheme::Thrift] {
        let headers = random_headers(&mut rng);
        // Same contents, different insertion order.
        let mut reordered: Vec<_> = headers.clone().into_iter().collect();
        reordered.reverse();
        let reordered: Headers = reordered.into_iter().collect();

        assert_eq!(
            registry.encode_headers(&headers, scheme).unwrap(),
            registry.encode_headers(&reordered, scheme).unwrap()
        );
    }
}

#[test]
fn responses_survive_the_wire() {
    let registry: SchemeRegistry = SchemeRegistry::default();
    let mut rng = rand::rng();

    for scheme in [ArgScheme::Json, ArgScheme::Thrift] {
        for id in 0..50 {
            let headers = random_headers(&mut rng);
            let order = random_order(&mut rng);

            let outbound = ResponseBuilder::new(id, scheme)
                .set_headers(headers.clone())
                .unwrap()
                .set_body(order.clone())
                .unwrap()
                .set_response_code(ResponseCode::Ok)
                .build(&registry)
                .unwrap();

            let (arg2, arg3) = outbound.into_args();
            let inbound = ResponseBuilder::<Order>::new(id, scheme)
                .set_arg2(arg2)
                .unwrap()
                .set_arg3(arg3)
                .unwrap()
                .set_response_code(ResponseCode::Ok)
                .build(&registry)
                .unwrap();

            assert_eq!(inbound.headers(&registry).unwrap(), &headers);
            assert_eq!(inbound.body(&registry).unwrap(), Some(&order));
        }
    }
}

#[test]
fn body_type_mismatch_is_a_codec_error() {
    let registry: SchemeRegistry = SchemeRegistry::default();

    for scheme in [ArgScheme::Json, ArgScheme::Thrift] {
        let arg3 = registry.encode_body(&vec![1i32, 2, 3], scheme).unwrap();
        let result: Result<Order, MessageError> = registry.decode_body(&arg3, scheme);
        assert!(matches!(result, Err(MessageError::Codec(_))));
    }
}

#[test]
fn unregistered_schemes_are_unsupported() {
    let registry: SchemeRegistry = SchemeRegistry::default();

    for scheme in [ArgScheme::Raw, ArgScheme::StreamingThrift] {
        assert!(!registry.supports(scheme));
        assert_eq!(
            registry.encode_headers(&Headers::new(), scheme).unwrap_err(),
            MessageError::UnsupportedScheme {
                scheme: scheme.to_string()
            }
        );
    }
}
