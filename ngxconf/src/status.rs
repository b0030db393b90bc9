//! `stub_status` page parsing
//!
//! The page served by `ngx_http_stub_status_module` looks like:
//!
//! ```text
//! Active connections: 291
//! server accepts handled requests
//!  16630948 16630948 31070465
//! Reading: 6 Writing: 179 Waiting: 106
//! ```

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

static ACTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Active connections:\s+(\d+)").expect("status regex can be created")
});

static TOTALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"server accepts handled requests\s+(\d+)\s+(\d+)\s+(\d+)")
        .expect("status regex can be created")
});

static STATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Reading:\s+(\d+)\s+Writing:\s+(\d+)\s+Waiting:\s+(\d+)")
        .expect("status regex can be created")
});

/// Counters reported by `stub_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StubStatus {
    pub active: u64,
    pub accepts: u64,
    pub handled: u64,
    pub requests: u64,
    pub reading: u64,
    pub writing: u64,
    pub waiting: u64,
}

impl StubStatus {
    pub fn parse(text: &str) -> Result<Self> {
        let active = section(&ACTIVE, text, "active connections")?;
        let totals = section(&TOTALS, text, "server accepts handled requests")?;
        let states = section(&STATES, text, "reading/writing/waiting")?;

        Ok(Self {
            active: number(&active, 1)?,
            accepts: number(&totals, 1)?,
            handled: number(&totals, 2)?,
            requests: number(&totals, 3)?,
            reading: number(&states, 1)?,
            writing: number(&states, 2)?,
            waiting: number(&states, 3)?,
        })
    }
}

fn section<'t>(re: &Regex, text: &'t str, name: &str) -> Result<Captures<'t>> {
    re.captures(text).ok_or_else(|| Error::Extraction {
        directive: "stub_status".to_string(),
        value: name.to_string(),
        reason: "section missing from status page".to_string(),
    })
}

fn number(captures: &Captures<'_>, group: usize) -> Result<u64> {
    let raw = captures.get(group).map_or("", |m| m.as_str());
    raw.parse().map_err(|e| Error::Extraction {
        directive: "stub_status".to_string(),
        value: raw.to_string(),
        reason: format!("{e}"),
    })
}
