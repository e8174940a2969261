// Orchestration of the `requests` operations.
//
// Each operation is a fixed sequence of platform calls and decodes. Later
// calls take their parameters from earlier results (a price needs a route,
// a new request needs a route and possibly the caller's identity), and the
// first failure ends the operation: nothing after it is called.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::api::{Platform, Query};
use crate::decode::{self, Route};
use crate::error::{ClientError, Result};
use crate::geocode::{Address, Geocoder};
use crate::vocab::{PartySpec, VehicleCategory};

/// Added to the route commitment to get a new request's SLA, in seconds.
pub const SLA_BUFFER_SECONDS: f64 = 1800.0;

/// Combined view of a request and its remaining time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub created: String,
    pub description: String,
    pub remaining: f64,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipperView {
    pub nickname: String,
    pub commitment: i64,
    pub reputation: f64,
}

/// Arguments of `requests new`, as typed by the user.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub description: String,
    pub origin: String,
    pub destination: String,
    pub vehicle: String,
    pub sender: String,
    pub receiver: String,
}

/// Creation payload for `POST /request`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDraft {
    pub description: String,
    pub vehicle_category: VehicleCategory,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub start: Leg,
    pub end: Leg,
    pub sla: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub address: AddressPayload,
    pub player: Party,
    pub dropins: Vec<Item>,
    pub dropoffs: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressPayload {
    /// Keyed by line index ("0", "1", ...).
    pub address_lines: BTreeMap<String, String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Address> for AddressPayload {
    fn from(address: &Address) -> Self {
        AddressPayload {
            address_lines: BTreeMap::from([("0".to_string(), address.line.clone())]),
            latitude: address.latitude,
            longitude: address.longitude,
        }
    }
}

/// Sender or receiver: `{"user": id}` or `{"phone": number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    User(String),
    Phone(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub description: String,
    pub quantity: u32,
    pub weight: u32,
}

pub struct RequestService<P, G> {
    platform: P,
    geocoder: G,
}

impl<P: Platform, G: Geocoder> RequestService<P, G> {
    pub fn new(platform: P, geocoder: G) -> Self {
        RequestService { platform, geocoder }
    }

    /// Requests created within `since` (a relative window such as `1d`).
    pub fn last(&self, since: &str) -> Result<Value> {
        let body = self.platform.fetch(
            &["requests", "last"],
            &vec![("since", since.to_string())],
            "last requests",
        )?;
        decode::raw(&body, "last requests")
    }

    pub fn list(&self) -> Result<Value> {
        let body = self.platform.fetch(&["requests"], &Query::new(), "requests")?;
        decode::raw(&body, "requests")
    }

    pub fn show(&self, id: &str) -> Result<Value> {
        let id = request_id(id)?;
        let body = self
            .platform
            .fetch(&["request", id], &Query::new(), "request")?;
        decode::raw(&body, "request")
    }

    pub fn offers(&self, id: &str) -> Result<Value> {
        let id = request_id(id)?;
        let body = self
            .platform
            .fetch(&["request", id, "offers"], &Query::new(), "request offers")?;
        decode::raw(&body, "request offers")
    }

    pub fn detail(&self, id: &str) -> Result<DetailView> {
        let id = request_id(id)?;
        let request_body = self
            .platform
            .fetch(&["request", id], &Query::new(), "request")?;
        let remaining_body = self
            .platform
            .fetch(&["request", id, "remaining"], &Query::new(), "remaining")?;

        let request = decode::request_detail(&request_body)?;
        let remaining = decode::remaining_minutes(&remaining_body)?;

        Ok(DetailView {
            created: request.created,
            description: format!("{} - {}", request.item_description, request.description),
            remaining,
            status: request.status.label(),
        })
    }

    /// Shippers available for a request, keyed by shipper id.
    pub fn availability(&self, id: &str) -> Result<BTreeMap<String, ShipperView>> {
        let id = request_id(id)?;
        let body = self.platform.fetch(
            &["request", id, "availability"],
            &Query::new(),
            "request availability",
        )?;

        Ok(decode::availability(&body)?
            .into_iter()
            .map(|s| {
                let view = ShipperView {
                    nickname: s.nickname,
                    commitment: s.commitment_minutes,
                    reputation: s.reputation,
                };
                (s.id, view)
            })
            .collect())
    }

    /// Quote for a single one-item section between two addresses.
    pub fn price(&self, origin: &str, destination: &str, vehicle: &str) -> Result<Value> {
        let from = self.geocoder.resolve(origin)?;
        let to = self.geocoder.resolve(destination)?;
        let route = self.route(&from, &to, "route")?;
        let vehicle = VehicleCategory::from_token(vehicle);

        tracing::info!(distance_km = route.distance_km, %vehicle, "quoting price");
        let query = vec![
            ("weight", "1".to_string()),
            ("items", "1".to_string()),
            ("sections", "1".to_string()),
            ("vehicle", vehicle.code().to_string()),
            ("distance", route.distance_km.to_string()),
        ];
        let body = self.platform.fetch(&["price"], &query, "price")?;
        decode::raw(&body, "price")
    }

    pub fn create(&self, args: &NewRequest) -> Result<Value> {
        let from = self.geocoder.resolve(&args.origin)?;
        let to = self.geocoder.resolve(&args.destination)?;
        let vehicle = VehicleCategory::from_token(&args.vehicle);

        let sender = PartySpec::parse(&args.sender);
        let receiver = PartySpec::parse(&args.receiver);
        // Only looked up when a party is "me"; phone-to-phone requests skip it.
        let me = if sender.is_me() || receiver.is_me() {
            Some(self.me()?)
        } else {
            None
        };
        let sender = party(sender, me.as_deref())?;
        let receiver = party(receiver, me.as_deref())?;

        let route = self.route(&from, &to, "route info")?;
        let draft = build_draft(&args.description, vehicle, &from, sender, &to, receiver, &route);

        let payload = serde_json::to_value(&draft).map_err(|source| ClientError::Encode {
            what: "new request payload".into(),
            source,
        })?;
        tracing::info!(sla = draft.sections[0].sla, %vehicle, "submitting new request");
        let body = self
            .platform
            .submit(&["request"], &Query::new(), &payload, "new request")?;
        decode::raw(&body, "new request")
    }

    /// Platform id of the acting user.
    fn me(&self) -> Result<String> {
        self.platform
            .fetch(&["me"], &Query::new(), "me")
            .and_then(|body| decode::identity(&body))
            .map(|identity| identity.id)
            .map_err(|err| ClientError::InputResolution {
                input: "me".into(),
                reason: err.to_string(),
            })
    }

    fn route(&self, from: &Address, to: &Address, label: &str) -> Result<Route> {
        let points = format!("{},{}", from.point(), to.point());
        let body = self
            .platform
            .fetch(&["route"], &vec![("points", points)], label)?;
        decode::route(&body)
    }
}

/// A request id must stay a single path segment; `.` and `..` would be
/// dropped by URL normalisation and address another resource.
fn request_id(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(ClientError::InputResolution {
            input: id.to_string(),
            reason: "not a request id".into(),
        });
    }
    Ok(trimmed)
}

fn party(spec: PartySpec, me: Option<&str>) -> Result<Party> {
    match spec {
        PartySpec::Phone(phone) => Ok(Party::Phone(phone)),
        PartySpec::Me => me
            .map(|id| Party::User(id.to_string()))
            .ok_or_else(|| ClientError::InputResolution {
                input: "me".into(),
                reason: "identity not looked up".into(),
            }),
    }
}

/// Assemble the creation payload: one section whose start leg picks the
/// item up and whose end leg drops it off.
pub fn build_draft(
    description: &str,
    vehicle: VehicleCategory,
    from: &Address,
    sender: Party,
    to: &Address,
    receiver: Party,
    route: &Route,
) -> RequestDraft {
    let items = vec![Item {
        description: description.to_string(),
        quantity: 1,
        weight: 1,
    }];

    let section = Section {
        start: Leg {
            address: from.into(),
            player: sender,
            dropins: items.clone(),
            dropoffs: Vec::new(),
        },
        end: Leg {
            address: to.into(),
            player: receiver,
            dropins: Vec::new(),
            dropoffs: items,
        },
        sla: route.commitment_seconds + SLA_BUFFER_SECONDS,
        distance: route.distance_meters,
    };

    RequestDraft {
        description: description.to_string(),
        vehicle_category: vehicle,
        sections: vec![section],
    }
}
