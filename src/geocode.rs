// Geocoding collaborator: turns a free-text address into an address line
// plus coordinates.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::api::{build_http_client, send};
use crate::config::Config;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub line: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Address {
    /// `lat,lng` with six decimals, as route queries expect.
    pub fn point(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

pub trait Geocoder {
    fn resolve(&self, text: &str) -> Result<Address>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn resolve(&self, text: &str) -> Result<Address> {
        (**self).resolve(text)
    }
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Hit {
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(NominatimGeocoder {
            client: build_http_client(config.timeout)?,
            base_url: config.geocoder_url.clone(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn resolve(&self, text: &str) -> Result<Address> {
        tracing::debug!(address = text, "geocoding");
        let req = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", text), ("format", "json"), ("limit", "1")]);

        let body = send(req, "geocode").map_err(|err| unresolved(text, err.to_string()))?;
        let address = first_hit(text, &body)?;
        tracing::debug!(line = %address.line, lat = address.latitude, lng = address.longitude, "geocoded");
        Ok(address)
    }
}

fn first_hit(text: &str, body: &str) -> Result<Address> {
    let hits: Vec<Hit> =
        serde_json::from_str(body).map_err(|err| unresolved(text, err.to_string()))?;
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| unresolved(text, "no match".into()))?;

    let coord = |raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|err| unresolved(text, format!("bad coordinate '{raw}': {err}")))
    };
    Ok(Address {
        latitude: coord(&hit.lat)?,
        longitude: coord(&hit.lon)?,
        line: hit.display_name,
    })
}

fn unresolved(text: &str, reason: String) -> ClientError {
    ClientError::InputResolution {
        input: text.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_first_hit() {
        let body = r#"[
            {"display_name": "Av. Corrientes 1234, CABA", "lat": "-34.6037", "lon": "-58.3816"},
            {"display_name": "Corrientes, AR", "lat": "-27.46", "lon": "-58.83"}
        ]"#;
        let address = first_hit("corrientes 1234", body).unwrap();
        assert_eq!(address.line, "Av. Corrientes 1234, CABA");
        assert_eq!(address.latitude, -34.6037);
        assert_eq!(address.point(), "-34.603700,-58.381600");
    }

    #[test]
    fn no_hits_is_an_input_resolution_error() {
        let err = first_hit("nowhere", "[]").unwrap_err();
        assert!(matches!(err, ClientError::InputResolution { ref input, .. } if input == "nowhere"));
    }

    #[test]
    fn unparseable_coordinates_are_rejected() {
        let body = r#"[{"display_name": "x", "lat": "north", "lon": "1"}]"#;
        assert!(matches!(
            first_hit("x", body).unwrap_err(),
            ClientError::InputResolution { .. }
        ));
    }
}
