//! Site-level setters
//!
//! Counterparts of the accessors in [`crate::getter`]. Each one reads and
//! edits only the first `server` block, and fails with
//! [`Error::NotFound`](crate::Error) when the document has none.

use crate::error::{Error, Result};
use crate::getter::{
    is_https_redirect, php_include_version, HSTS_HEADER, HTTPS_REDIRECT_TARGET, PHP_INCLUDE_PREFIX,
    PHP_INCLUDE_SUFFIX,
};
use crate::mutate::replace;
use crate::parser::{Block, Directive, Document, Parameter, QuoteStyle};

const SERVER: &str = "server";

const HSTS_VALUE: &str = "max-age=31536000";

/// TLS directives written by [`Document::set_https`] besides the key pair
const TLS_DEFAULTS: &[(&str, &[&str])] = &[
    ("ssl_session_timeout", &["1d"]),
    ("ssl_session_cache", &["shared:SSL:10m"]),
    ("ssl_protocols", &["TLSv1.2", "TLSv1.3"]),
    ("ssl_prefer_server_ciphers", &["off"]),
];

const TLS_DIRECTIVES: &[&str] = &[
    "ssl_certificate",
    "ssl_certificate_key",
    "ssl_session_timeout",
    "ssl_session_cache",
    "ssl_session_tickets",
    "ssl_protocols",
    "ssl_ciphers",
    "ssl_prefer_server_ciphers",
    "ssl_stapling",
    "ssl_stapling_verify",
];

impl Document {
    /// One `listen` directive per entry
    pub fn set_listen<I, P>(&mut self, listens: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<P>>,
        P: Into<Parameter>,
    {
        let directives = listens
            .into_iter()
            .map(|params| Directive::new("listen").with_params(params))
            .collect();
        replace(self.server_mut()?, "listen", directives);
        Ok(())
    }

    pub fn set_server_name<I, P>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        self.set_single("server_name", names)
    }

    pub fn set_index<I, P>(&mut self, index: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        self.set_single("index", index)
    }

    pub fn set_root(&mut self, root: &str) -> Result<()> {
        self.set_single("root", [root])
    }

    /// One `include` directive per entry, replacing every existing include
    pub fn set_includes<I, P>(&mut self, includes: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        let directives = includes
            .into_iter()
            .map(|include| Directive::new("include").with_params([include]))
            .collect();
        replace(self.server_mut()?, "include", directives);
        Ok(())
    }

    /// Point the site at `enable-php-<version>.conf`; 0 disables PHP
    pub fn set_php(&mut self, version: u32) -> Result<()> {
        let server = self.server_mut()?;

        // Keep the first PHP include so it can be rewritten in place.
        let mut seen = false;
        server.retain(|d| {
            if !is_php_include(d) {
                return true;
            }
            let keep = !seen && version != 0;
            seen = true;
            keep
        });
        if version == 0 {
            return Ok(());
        }

        let include = format!("{PHP_INCLUDE_PREFIX}{version}{PHP_INCLUDE_SUFFIX}");
        let existing = server.iter_mut().find(|d| is_php_include(d));
        match existing {
            Some(directive) => directive.set_params([include]),
            None => server.push(Directive::new("include").with_params([include])),
        }
        Ok(())
    }

    /// Serve TLS with the given certificate chain and private key
    pub fn set_https(&mut self, certificate: &str, key: &str) -> Result<()> {
        let server = self.server_mut()?;
        replace(server, "ssl_certificate", vec![single("ssl_certificate", [certificate])]);
        replace(server, "ssl_certificate_key", vec![single("ssl_certificate_key", [key])]);
        for (name, params) in TLS_DEFAULTS {
            replace(server, name, vec![single(name, params.iter().copied())]);
        }
        Ok(())
    }

    /// Drop TLS along with everything that only makes sense over it
    pub fn clear_https(&mut self) -> Result<()> {
        let server = self.server_mut()?;
        server.retain(|d| {
            !TLS_DIRECTIVES.contains(&d.name.as_str()) && !is_hsts(d) && !is_redirect(d)
        });
        for listen in server.iter_mut().filter(|d| d.name == "listen") {
            listen.parameters.retain(|p| p != "ssl");
        }
        Ok(())
    }

    pub fn set_ocsp(&mut self, enabled: bool) -> Result<()> {
        let server = self.server_mut()?;
        for name in ["ssl_stapling", "ssl_stapling_verify"] {
            let directives = if enabled {
                vec![single(name, ["on"])]
            } else {
                Vec::new()
            };
            replace(server, name, directives);
        }
        Ok(())
    }

    pub fn set_hsts(&mut self, enabled: bool) -> Result<()> {
        let server = self.server_mut()?;
        if !enabled {
            server.retain(|d| !is_hsts(d));
        } else if !server.iter().any(is_hsts) {
            server.push(Directive::new("add_header").with_params([
                Parameter::new(HSTS_HEADER),
                Parameter::quoted(HSTS_VALUE, QuoteStyle::Double),
            ]));
        }
        Ok(())
    }

    /// Add or remove `if ($scheme = http) { return 308 https://$host$request_uri; }`
    pub fn set_http_redirect(&mut self, enabled: bool) -> Result<()> {
        let server = self.server_mut()?;
        if !enabled {
            server.retain(|d| !is_redirect(d));
        } else if !server.iter().any(is_redirect) {
            server.push(
                Directive::new("if")
                    .with_params(["($scheme", "=", "http)"])
                    .with_block(Block::new(vec![
                        Directive::new("return").with_params(["308", HTTPS_REDIRECT_TARGET]),
                    ])),
            );
        }
        Ok(())
    }

    pub fn set_access_log(&mut self, path: &str) -> Result<()> {
        self.set_single("access_log", [path])
    }

    pub fn set_error_log(&mut self, path: &str) -> Result<()> {
        self.set_single("error_log", [path])
    }

    /// Directives of the first `server` block
    fn server_mut(&mut self) -> Result<&mut Vec<Directive>> {
        self.parent_block_mut(&[SERVER.to_string()])
            .ok_or_else(|| Error::not_found(SERVER))
    }

    /// Replace `<name>` in the first server with a single directive
    fn set_single<I, P>(&mut self, name: &str, params: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        replace(self.server_mut()?, name, vec![single(name, params)]);
        tracing::debug!(directive = name, "set server directive");
        Ok(())
    }
}

fn single<I, P>(name: &str, params: I) -> Directive
where
    I: IntoIterator<Item = P>,
    P: Into<Parameter>,
{
    Directive::new(name).with_params(params)
}

fn is_hsts(directive: &Directive) -> bool {
    directive.name == "add_header" && directive.has_param(HSTS_HEADER)
}

fn is_redirect(directive: &Directive) -> bool {
    directive.name == "if" && is_https_redirect(directive)
}

fn is_php_include(directive: &Directive) -> bool {
    directive.name == "include"
        && directive
            .parameters
            .iter()
            .any(|p| php_include_version(p).is_some())
}
