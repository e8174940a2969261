//! In-memory platform and geocoder used to drive `RequestService`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use envios_cli::api::{Platform, Query};
use envios_cli::error::{ClientError, Result};
use envios_cli::geocode::{Address, Geocoder};

/// One call received by the fake platform.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    /// Segments joined with `/`, e.g. `/request/r-1/offers`.
    pub path: String,
    pub segments: Vec<String>,
    pub query: Query,
    pub label: String,
    pub body: Option<Value>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

enum Reply {
    Body(String),
    Status(u16),
}

/// Answers by path; unknown paths get a 404.
#[derive(Default)]
pub struct FakePlatform {
    replies: HashMap<String, Reply>,
    calls: RefCell<Vec<Call>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, path: &str, body: Value) -> Self {
        self.replies.insert(path.to_string(), Reply::Body(body.to_string()));
        self
    }

    pub fn reply_raw(mut self, path: &str, body: &str) -> Self {
        self.replies.insert(path.to_string(), Reply::Body(body.to_string()));
        self
    }

    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.replies.insert(path.to_string(), Reply::Status(status));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.path.clone()).collect()
    }

    fn answer(&self, call: Call) -> Result<String> {
        let path = call.path.clone();
        let label = call.label.clone();
        self.calls.borrow_mut().push(call);
        match self.replies.get(&path) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(ClientError::Status {
                label,
                status: *status,
                body: "upstream error".into(),
            }),
            None => Err(ClientError::Status {
                label,
                status: 404,
                body: format!("no route for {path}"),
            }),
        }
    }
}

impl Platform for FakePlatform {
    fn fetch(&self, path: &[&str], query: &Query, label: &str) -> Result<String> {
        self.answer(Call {
            method: "GET",
            path: joined(path),
            segments: path.iter().map(|s| s.to_string()).collect(),
            query: query.clone(),
            label: label.to_string(),
            body: None,
        })
    }

    fn submit(&self, path: &[&str], query: &Query, body: &Value, label: &str) -> Result<String> {
        self.answer(Call {
            method: "POST",
            path: joined(path),
            segments: path.iter().map(|s| s.to_string()).collect(),
            query: query.clone(),
            label: label.to_string(),
            body: Some(body.clone()),
        })
    }
}

fn joined(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

/// Resolves only the addresses it was given.
#[derive(Default)]
pub struct FakeGeocoder {
    known: HashMap<String, Address>,
    lookups: RefCell<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, latitude: f64, longitude: f64) -> Self {
        self.known.insert(
            text.to_string(),
            Address {
                line: format!("{text}, Buenos Aires"),
                latitude,
                longitude,
            },
        );
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl Geocoder for FakeGeocoder {
    fn resolve(&self, text: &str) -> Result<Address> {
        self.lookups.borrow_mut().push(text.to_string());
        self.known
            .get(text)
            .cloned()
            .ok_or_else(|| ClientError::InputResolution {
                input: text.to_string(),
                reason: "no match".into(),
            })
    }
}

/// Geocoder knowing "Corrientes 1234" and "Cabildo 2000".
pub fn city() -> FakeGeocoder {
    FakeGeocoder::new()
        .with("Corrientes 1234", -34.6037, -58.3816)
        .with("Cabildo 2000", -34.5614, -58.4563)
}
