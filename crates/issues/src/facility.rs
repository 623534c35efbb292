use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Physical site an issue belongs to. Only these facilities accept issues.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Montreal,
    El,
}

impl Facility {
    pub const ALL: [Facility; 2] = [Facility::Montreal, Facility::El];

    pub fn as_str(self) -> &'static str {
        match self {
            Facility::Montreal => "montreal",
            Facility::El => "el",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Facility::Montreal => "Montreal Facility",
            Facility::El => "El Facility",
        }
    }
}

impl FromStr for Facility {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facility::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownFacility(s.to_string()))
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Static description of a facility, served to the map view as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityInfo {
    pub name: &'static str,
    pub id: Facility,
    pub region: Vec<LatLng>,
}

const fn ll(lat: f64, lng: f64) -> LatLng {
    LatLng { lat, lng }
}

pub fn facility_catalog() -> Vec<FacilityInfo> {
    Facility::ALL
        .into_iter()
        .map(|id| FacilityInfo {
            name: id.display_name(),
            id,
            region: region_of(id).to_vec(),
        })
        .collect()
}

fn region_of(facility: Facility) -> &'static [LatLng] {
    static MONTREAL: [LatLng; 4] = [
        ll(45.643634, -73.527693),
        ll(45.644899, -73.526520),
        ll(45.642727, -73.521655),
        ll(45.641473, -73.522854),
    ];
    static EL: [LatLng; 5] = [
        ll(45.641858, -73.522272),
        ll(45.643710, -73.520559),
        ll(45.643289, -73.519494),
        ll(45.642545, -73.519196),
        ll(45.640949, -73.520143),
    ];
    match facility {
        Facility::Montreal => &MONTREAL,
        Facility::El => &EL,
    }
}
