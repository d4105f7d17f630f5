use docroot::http::parser::{ParseError, has_head_end, has_request_line, parse_request_line};
use docroot::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request_line(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.target, "/");
}

#[test]
fn test_parse_ignores_version_and_headers() {
    let req = b"GET /a.png HTTP/9.9\r\nBrokenHeader\r\nContent-Length: nope\r\n\r\nbody";
    let parsed = parse_request_line(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.target, "/a.png");
}

#[test]
fn test_parse_request_line_without_version() {
    let parsed = parse_request_line(b"GET /index.html").unwrap();
    assert_eq!(parsed.target, "/index.html");
}

#[test]
fn test_parse_keeps_query_string_verbatim() {
    let parsed = parse_request_line(b"GET /search?q=rust HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(parsed.target, "/search?q=rust");
}

#[test]
fn test_parse_empty_buffer() {
    assert_eq!(parse_request_line(b""), Err(ParseError::Empty));
}

#[test]
fn test_parse_whitespace_only() {
    assert_eq!(parse_request_line(b" \r\n\t \r\n"), Err(ParseError::Empty));
}

#[test]
fn test_parse_missing_target_keeps_method() {
    let result = parse_request_line(b"GET\r\n\r\n");
    assert_eq!(
        result,
        Err(ParseError::MissingTarget {
            method: "GET".to_string()
        })
    );
}

#[test]
fn test_parse_tokens_may_span_lines() {
    // Tokens are taken from the whole buffer, not only the first line
    let parsed = parse_request_line(b"GET\r\n/late.html\r\n").unwrap();
    assert_eq!(parsed.target, "/late.html");
}

#[test]
fn test_parse_nul_ends_buffer() {
    let result = parse_request_line(b"GET\0 /hidden.html HTTP/1.1\r\n");
    assert!(matches!(result, Err(ParseError::MissingTarget { .. })));
}

#[test]
fn test_parse_invalid_utf8_target() {
    let result = parse_request_line(b"GET /\xff\xfe.html HTTP/1.1\r\n");
    assert_eq!(result, Err(ParseError::Unreadable));
}

#[test]
fn test_parse_long_method_is_truncated_not_rejected() {
    let parsed = parse_request_line(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ /x.html HTTP/1.1\r\n").unwrap();

    assert_eq!(parsed.method, Method::Other("ABCDEFGHIJKLMNO".to_string()));
    assert_eq!(parsed.target, "/x.html");
}

#[test]
fn test_parse_methods_are_case_sensitive() {
    let parsed = parse_request_line(b"get / HTTP/1.1\r\n").unwrap();
    assert_eq!(parsed.method, Method::Other("get".to_string()));
}

#[test]
fn test_parse_various_http_methods() {
    assert_eq!(
        parse_request_line(b"GET / HTTP/1.1\r\n\r\n").unwrap().method,
        Method::GET
    );

    for method_str in ["POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"] {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let parsed = parse_request_line(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, Method::Other(method_str.to_string()));
    }
}

#[test]
fn test_has_request_line() {
    assert!(has_request_line(b"GET / HTTP/1.1\r\n"));
    assert!(has_request_line(b"GET /\n"));
    assert!(!has_request_line(b"GET / HTTP/1.1"));
    assert!(!has_request_line(b""));
}

#[test]
fn test_has_head_end() {
    assert!(has_head_end(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"));
    assert!(has_head_end(b"GET / HTTP/1.1\n\n"));
    assert!(!has_head_end(b"GET / HTTP/1.1\r\nCookie: abc\r\n"));
    assert!(!has_head_end(b"GET / HTTP/1.1\r\n"));
}
