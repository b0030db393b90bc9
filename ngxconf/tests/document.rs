use ngxconf::{parse, render, render_with, Document, Error, RenderOptions, SyntaxError};
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("Failed to read fixture file")
}

fn reparse(doc: &Document) -> Document {
    parse(&render(doc)).expect("rendered text must parse")
}

#[test]
fn test_round_trip_fixtures() {
    for name in ["nginx.conf", "site.conf"] {
        let doc = parse(&fixture(name)).unwrap();
        assert_eq!(reparse(&doc), doc, "{name}");
    }
}

#[test]
fn test_render_is_idempotent() {
    for name in ["nginx.conf", "site.conf"] {
        let first = render(&parse(&fixture(name)).unwrap());
        let second = render(&parse(&first).unwrap());
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn test_round_trip_with_tabs() {
    let doc = parse(&fixture("nginx.conf")).unwrap();
    let options = RenderOptions {
        use_tabs: true,
        ..RenderOptions::default()
    };
    assert_eq!(parse(&render_with(&doc, &options)).unwrap(), doc);
}

#[test]
fn test_nginx_conf_structure() {
    let doc = parse(&fixture("nginx.conf")).unwrap();

    let names: Vec<&str> = doc.directives.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["user", "worker_processes", "error_log", "pid", "worker_rlimit_nofile", "events", "http"]
    );

    let log_format = doc.find_one("http.log_format").unwrap();
    assert_eq!(log_format.parameters.len(), 3);
    assert!(log_format.parameters[1].contains("\"$request\""));

    let map = doc.find_one("http.map").unwrap();
    assert_eq!(map.children()[1].name, "");
    assert_eq!(map.children()[1].param(0), Some("close"));

    let status = doc.find("http.server.location.stub_status").unwrap();
    assert_eq!(status.len(), 1);

    let rewrite = doc.find_one("http.server.location.rewrite").unwrap();
    assert_eq!(rewrite.param(0), Some(r"^/(\d+)/(.*)$"));

    assert_eq!(
        doc.find_one("http.include").unwrap().param(0),
        Some("mime.types")
    );
    assert_eq!(doc.find("http.include").unwrap().len(), 2);
}

#[test]
fn test_site_accessors() {
    let doc = parse(&fixture("site.conf")).unwrap();
    let summary = doc.summary().unwrap();
    assert_eq!(summary.listen.len(), 3);
    assert_eq!(summary.server_name, vec!["example.com", "www.example.com"]);
    assert_eq!(summary.root.as_deref(), Some("/www/wwwroot/example.com"));
    assert_eq!(summary.php, Some(81));
    assert!(summary.https);
    assert!(summary.ocsp);
    assert!(summary.hsts);
    assert!(summary.http_redirect);
    assert_eq!(summary.access_log.as_deref(), Some("/www/wwwlogs/example.com.log"));
    assert_eq!(summary.includes.len(), 2);
}

#[test]
fn test_edit_session() {
    let mut doc = parse(&fixture("site.conf")).unwrap();
    doc.clear_https().unwrap();
    doc.set_php(0).unwrap();
    doc.set_server_name(["example.org"]).unwrap();

    let text = render(&doc);
    let reloaded = parse(&text).unwrap();
    assert_eq!(reloaded, doc);
    assert!(!reloaded.https());
    assert!(!reloaded.http_redirect());
    assert_eq!(reloaded.php().unwrap(), None);
    assert_eq!(reloaded.server_name(), vec!["example.org"]);
    // Unrelated directives keep their place.
    let location_count = reloaded.find("server.location").unwrap().len();
    assert_eq!(location_count, 2);
    assert!(!text.contains("ssl_certificate"));
}

#[test]
fn test_syntax_errors_return_no_document() {
    let cases = [
        ("server { listen 80; } }", "unmatched close"),
        ("server { listen 80;", "unclosed block"),
        ("server { ; }", "empty directive"),
        ("server_name \"a;", "unterminated quote"),
        ("listen 80", "unterminated directive"),
    ];
    for (source, what) in cases {
        let err = parse(source).expect_err(what);
        let wrapped: Error = err.clone().into();
        assert!(matches!(wrapped, Error::Syntax(_)), "{what}");
    }

    let err = parse("events {}\n  }").unwrap_err();
    assert!(matches!(err, SyntaxError::UnmatchedClose { .. }));
    assert_eq!(err.position().line, 2);
    assert_eq!(err.position().column, 3);
}
