use argscheme::MessageError;
use argscheme::codec::ArgScheme;
use argscheme::constants::{ARG_SCHEME_KEY, CALLER_NAME_KEY};
use argscheme::message::{Request, RequestBuilder};

#[test]
fn missing_service_is_rejected() {
    let err = RequestBuilder::<String>::new("body".to_string(), "", "echo")
        .build()
        .unwrap_err();

    assert_eq!(err, MessageError::MissingRequiredField { field: "service" });
    assert!(err.to_string().contains("service"));
}

#[test]
fn missing_endpoint_is_rejected() {
    let builder = RequestBuilder::<String>::new("body".to_string(), "svc", "");

    assert_eq!(
        builder.validate().unwrap_err(),
        MessageError::MissingRequiredField { field: "endpoint" }
    );
    assert!(builder.build().is_err());
}

#[test]
fn request_keeps_structured_values() {
    let request = Request::<Vec<u32>>::builder(vec![1, 2, 3], "svc", "sum")
        .set_arg_scheme(ArgScheme::Json)
        .set_transport_headers([(CALLER_NAME_KEY, "tests")])
        .set_header("a", "1")
        .build()
        .unwrap();

    assert_eq!(request.service(), "svc");
    assert_eq!(request.endpoint(), "sum");
    assert_eq!(request.transport_header(ARG_SCHEME_KEY), Some("json"));
    assert_eq!(request.transport_header(CALLER_NAME_KEY), Some("tests"));
    assert_eq!(request.header("a"), Some("1"));
    assert_eq!(request.body(), Some(&vec![1, 2, 3]));
    assert_eq!(request.arg_scheme().unwrap(), Some(ArgScheme::Json));
}

#[test]
fn body_may_be_absent() {
    let request = Request::<String>::builder(None, "svc", "ping")
        .build()
        .unwrap();

    assert_eq!(request.body(), None);
    assert!(request.headers().is_empty());
    assert_eq!(request.arg_scheme().unwrap(), None);
}

#[test]
fn transport_headers_merge_last_write_wins() {
    let request = Request::<()>::builder(None, "svc", "ping")
        .set_transport_header(CALLER_NAME_KEY, "first")
        .set_transport_headers([(CALLER_NAME_KEY, "second")])
        .build()
        .unwrap();

    assert_eq!(request.transport_header(CALLER_NAME_KEY), Some("second"));
}

#[test]
fn request_is_shareable_across_threads() {
    let request = Request::<String>::builder("x".to_string(), "svc", "ping")
        .set_header("k", "v")
        .build()
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(request.header("k"), Some("v"));
                assert_eq!(request.body().map(String::as_str), Some("x"));
            });
        }
    });
}
