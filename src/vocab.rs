// Fixed vocabularies of the platform: vehicle categories, request status
// codes and the sender/receiver argument form.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCategory {
    Bicycle = 0,
    Car = 1,
    Van = 2,
    Truck = 3,
}

impl VehicleCategory {
    /// Map a human token to a category.
    ///
    /// Unrecognized tokens fall back to `Bicycle`, the zero value the
    /// platform has always received for them.
    pub fn from_token(token: &str) -> Self {
        match token {
            "bici" => VehicleCategory::Bicycle,
            "auto" => VehicleCategory::Car,
            "miniflete" => VehicleCategory::Van,
            "camion" => VehicleCategory::Truck,
            other => {
                tracing::warn!(token = other, "unknown vehicle token, using bici");
                VehicleCategory::Bicycle
            }
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// The platform expects the numeric code, not the variant name.
impl Serialize for VehicleCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    AwaitingResponse,
    Expired,
    Accepted,
    Cancelled,
    Aborted,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pendiente",
            RequestStatus::AwaitingResponse => "Esperando respuesta",
            RequestStatus::Expired => "Vencido",
            RequestStatus::Accepted => "Aceptado",
            RequestStatus::Cancelled => "Cancelado",
            RequestStatus::Aborted => "Abortado",
        }
    }
}

impl TryFrom<i64> for RequestStatus {
    type Error = ClientError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => RequestStatus::Pending,
            1 => RequestStatus::AwaitingResponse,
            2 => RequestStatus::Expired,
            3 => RequestStatus::Accepted,
            4 => RequestStatus::Cancelled,
            5 => RequestStatus::Aborted,
            other => return Err(ClientError::UnknownStatus(other)),
        })
    }
}

/// Sender/receiver as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartySpec {
    Me,
    Phone(String),
}

impl PartySpec {
    pub fn parse(raw: &str) -> Self {
        if raw == "me" {
            PartySpec::Me
        } else {
            PartySpec::Phone(raw.to_string())
        }
    }

    pub fn is_me(&self) -> bool {
        matches!(self, PartySpec::Me)
    }
}
