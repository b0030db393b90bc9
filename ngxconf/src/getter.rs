//! Site-level accessors
//!
//! Typed views over a virtual host file. An absent directive yields an empty
//! or `false` value; only data that is present but unusable is an error.

use crate::error::{Error, Result};
use crate::parser::{Directive, Document};
use serde::Serialize;

/// Include file that switches a site to a PHP-FPM version
pub(crate) const PHP_INCLUDE_PREFIX: &str = "enable-php-";
pub(crate) const PHP_INCLUDE_SUFFIX: &str = ".conf";

pub(crate) const HSTS_HEADER: &str = "Strict-Transport-Security";
pub(crate) const HTTPS_REDIRECT_TARGET: &str = "https://$host$request_uri";

/// Everything the accessors know about a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub listen: Vec<Vec<String>>,
    pub server_name: Vec<String>,
    pub index: Vec<String>,
    pub root: Option<String>,
    pub includes: Vec<String>,
    pub php: Option<u32>,
    pub https: bool,
    pub ocsp: bool,
    pub hsts: bool,
    pub http_redirect: bool,
    pub access_log: Option<String>,
    pub error_log: Option<String>,
}

impl Document {
    /// Parameters of every `server.listen`, one entry per directive
    pub fn listen(&self) -> Vec<Vec<&str>> {
        self.all("server.listen").map(Directive::params).collect()
    }

    pub fn server_name(&self) -> Vec<&str> {
        self.params_of("server.server_name")
    }

    pub fn index(&self) -> Vec<&str> {
        self.params_of("server.index")
    }

    pub fn root(&self) -> Option<&str> {
        self.first_param("server.root")
    }

    /// Raw `include` references; included files are not opened
    pub fn includes(&self) -> Vec<&str> {
        self.all("server.include").flat_map(Directive::params).collect()
    }

    /// PHP version selected through an `enable-php-<N>.conf` include.
    ///
    /// The last such include wins. A matching include whose version part is
    /// not a number is reported as [`Error::Extraction`].
    pub fn php(&self) -> Result<Option<u32>> {
        let mut version = None;
        for directive in self.all("server.include") {
            for param in directive.params() {
                if let Some(middle) = php_include_version(param) {
                    version = Some(parse_php_version(param, middle)?);
                }
            }
        }
        Ok(version)
    }

    /// A site serves TLS when it names a certificate
    pub fn https(&self) -> bool {
        self.lookup("server.ssl_certificate")
            .is_some_and(|d| !d.parameters.is_empty())
    }

    pub fn ocsp(&self) -> bool {
        self.first_param("server.ssl_stapling") == Some("on")
    }

    pub fn hsts(&self) -> bool {
        self.all("server.add_header")
            .any(|d| d.has_param(HSTS_HEADER))
    }

    /// True when an `if` block redirects to the same URL over HTTPS
    pub fn http_redirect(&self) -> bool {
        self.all("server.if").any(is_https_redirect)
    }

    pub fn access_log(&self) -> Option<&str> {
        self.first_param("server.access_log")
    }

    pub fn error_log(&self) -> Option<&str> {
        self.first_param("server.error_log")
    }

    /// Collect every accessor; fails only when [`Document::php`] does
    pub fn summary(&self) -> Result<SiteSummary> {
        let owned = |v: Vec<&str>| v.into_iter().map(str::to_string).collect::<Vec<_>>();
        Ok(SiteSummary {
            listen: self.listen().into_iter().map(owned).collect(),
            server_name: owned(self.server_name()),
            index: owned(self.index()),
            root: self.root().map(str::to_string),
            includes: owned(self.includes()),
            php: self.php()?,
            https: self.https(),
            ocsp: self.ocsp(),
            hsts: self.hsts(),
            http_redirect: self.http_redirect(),
            access_log: self.access_log().map(str::to_string),
            error_log: self.error_log().map(str::to_string),
        })
    }

    fn all(&self, path: &str) -> std::vec::IntoIter<&Directive> {
        self.find(path).unwrap_or_default().into_iter()
    }

    fn params_of(&self, path: &str) -> Vec<&str> {
        self.lookup(path).map(Directive::params).unwrap_or_default()
    }

    fn first_param(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(|d| d.param(0))
    }
}

pub(crate) fn is_https_redirect(directive: &Directive) -> bool {
    directive
        .children()
        .iter()
        .any(|d| d.name == "return" && d.has_param(HTTPS_REDIRECT_TARGET))
}

/// Version part of `enable-php-<N>.conf`, if `param` has that shape
pub(crate) fn php_include_version(param: &str) -> Option<&str> {
    param
        .strip_prefix(PHP_INCLUDE_PREFIX)?
        .strip_suffix(PHP_INCLUDE_SUFFIX)
}

fn parse_php_version(param: &str, middle: &str) -> Result<u32> {
    let extraction = |reason: String| Error::Extraction {
        directive: "include".to_string(),
        value: param.to_string(),
        reason,
    };
    if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
        return Err(extraction(format!(
            "expected {PHP_INCLUDE_PREFIX}<number>{PHP_INCLUDE_SUFFIX}"
        )));
    }
    middle.parse().map_err(|e| extraction(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SITE: &str = r#"
        server {
            listen 80;
            listen 443 ssl http2;
            server_name example.com www.example.com;
            index index.php index.html;
            root /www/wwwroot/example.com;

            include enable-php-74.conf;
            include rewrite/example.com.conf;

            ssl_certificate /www/server/vhost/ssl/example.com.pem;
            ssl_certificate_key /www/server/vhost/ssl/example.com.key;
            ssl_stapling on;
            add_header Strict-Transport-Security "max-age=31536000";

            if ($scheme = http) {
                return 301 https://$host$request_uri;
            }

            access_log /www/wwwlogs/example.com.log;
            error_log /www/wwwlogs/example.com.error.log;
        }
    "#;

    #[test]
    fn test_full_site() {
        let doc = parse(SITE).unwrap();
        assert_eq!(doc.listen(), vec![vec!["80"], vec!["443", "ssl", "http2"]]);
        assert_eq!(doc.server_name(), vec!["example.com", "www.example.com"]);
        assert_eq!(doc.index(), vec!["index.php", "index.html"]);
        assert_eq!(doc.root(), Some("/www/wwwroot/example.com"));
        assert_eq!(doc.includes(), vec!["enable-php-74.conf", "rewrite/example.com.conf"]);
        assert_eq!(doc.php().unwrap(), Some(74));
        assert!(doc.https());
        assert!(doc.ocsp());
        assert!(doc.hsts());
        assert!(doc.http_redirect());
        assert_eq!(doc.access_log(), Some("/www/wwwlogs/example.com.log"));
        assert_eq!(doc.error_log(), Some("/www/wwwlogs/example.com.error.log"));
    }

    #[test]
    fn test_absent_everything() {
        let doc = parse("server { }").unwrap();
        assert!(doc.listen().is_empty());
        assert!(doc.server_name().is_empty());
        assert!(doc.index().is_empty());
        assert_eq!(doc.root(), None);
        assert!(doc.includes().is_empty());
        assert_eq!(doc.php().unwrap(), None);
        assert!(!doc.https());
        assert!(!doc.ocsp());
        assert!(!doc.hsts());
        assert!(!doc.http_redirect());
        assert_eq!(doc.access_log(), None);
        assert_eq!(doc.error_log(), None);

        let empty = parse("").unwrap();
        assert!(!empty.https());
        assert_eq!(empty.summary().unwrap().listen, Vec::<Vec<String>>::new());
    }

    #[test]
    fn test_present_without_parameters() {
        let doc = parse("server { root; ssl_certificate; ssl_stapling; }").unwrap();
        assert_eq!(doc.root(), None);
        assert!(!doc.https());
        assert!(!doc.ocsp());
    }

    #[test]
    fn test_ocsp_requires_literal_on() {
        let doc = parse("server { ssl_stapling off; }").unwrap();
        assert!(!doc.ocsp());
        let doc = parse("server { ssl_stapling ON; }").unwrap();
        assert!(!doc.ocsp());
    }

    #[test]
    fn test_http_redirect_other_target() {
        let doc = parse(
            "server { if ($scheme = http) { return 301 https://example.com$request_uri; } }",
        )
        .unwrap();
        assert!(!doc.http_redirect());

        let doc = parse("server { return 301 https://$host$request_uri; }").unwrap();
        assert!(!doc.http_redirect());
    }

    #[test]
    fn test_php_malformed() {
        let doc = parse("server { include enable-php-xyz.conf; }").unwrap();
        let err = doc.php().unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction { ref value, .. } if value == "enable-php-xyz.conf"
        ));
        assert!(doc.summary().is_err());

        let doc = parse("server { include enable-php-.conf; }").unwrap();
        assert!(doc.php().is_err());
    }

    #[test]
    fn test_php_ignores_unrelated_includes() {
        let doc = parse("server { include enable-php-80.conf.bak; include php.conf; }").unwrap();
        assert_eq!(doc.php().unwrap(), None);

        let doc = parse("server { include other.conf enable-php-81.conf; }").unwrap();
        assert_eq!(doc.php().unwrap(), Some(81));
    }

    #[test]
    fn test_multiple_servers() {
        let doc = parse("server { listen 80; } server { listen 8080; server_name b; }").unwrap();
        assert_eq!(doc.listen(), vec![vec!["80"], vec!["8080"]]);
        assert_eq!(doc.server_name(), vec!["b"]);
    }

    #[test]
    fn test_summary_serializes() {
        let doc = parse(SITE).unwrap();
        let json = serde_json::to_value(doc.summary().unwrap()).unwrap();
        assert_eq!(json["php"], 74);
        assert_eq!(json["listen"][1][1], "ssl");
        assert_eq!(json["root"], "/www/wwwroot/example.com");
    }
}
