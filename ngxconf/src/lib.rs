//! ngxconf: nginx configuration parser
//!
//! This crate parses nginx/OpenResty configuration text into an editable
//! document tree, answers dotted path queries against it, and renders it
//! back to text. It never touches the filesystem.
//!
//! # Example
//!
//! ```rust
//! let source = r#"
//!     server {
//!         listen 80;
//!         server_name example.com;
//!         if ($scheme = http) {
//!             return 301 https://$host$request_uri;
//!         }
//!     }
//! "#;
//!
//! let mut doc = ngxconf::parse(source).unwrap();
//! assert_eq!(doc.find("server.listen").unwrap().len(), 1);
//! assert!(doc.http_redirect());
//! assert!(!doc.https());
//!
//! doc.set_root("/srv/example").unwrap();
//! let text = ngxconf::render(&doc);
//! assert_eq!(ngxconf::parse(&text).unwrap(), doc);
//! ```

pub mod diagnostic;
pub mod error;
pub mod getter;
pub mod mutate;
pub mod parser;
pub mod query;
pub mod render;
pub mod setter;
pub mod status;

pub use error::{Error, Result};
pub use getter::SiteSummary;
pub use parser::{
    parse, parse_tokens, tokenize, Block, Directive, Document, Location, Parameter, Position,
    QuoteStyle, Spanned, SyntaxError, Token, MAX_DEPTH,
};
pub use query::QueryPath;
pub use render::{render, render_directive, render_with, RenderOptions};
pub use status::StubStatus;
