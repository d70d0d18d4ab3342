use serde::{Deserialize, Serialize};

/// Vehicle classes priced by the rating table. Anything else lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Sedan,
    Suv,
    Truck,
    Other,
}

impl VehicleType {
    /// Case-folding, never-failing parse used for free-text form input.
    pub fn from_label(raw: &str) -> Self {
        match fold_label(raw).as_str() {
            "sedan" => Self::Sedan,
            "suv" => Self::Suv,
            "truck" => Self::Truck,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sedan => "sedan",
            Self::Suv => "suv",
            Self::Truck => "truck",
            Self::Other => "other",
        }
    }
}

/// Self-reported incident history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivingHistory {
    Clean,
    Minor,
    Major,
    Other,
}

impl DrivingHistory {
    /// Accepts bare values (`"minor"`) as well as the form labels
    /// (`"Minor (1-2 incident reports)"`).
    pub fn from_label(raw: &str) -> Self {
        match fold_label(raw).as_str() {
            "clean" => Self::Clean,
            "minor" => Self::Minor,
            "major" => Self::Major,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Other => "other",
        }
    }
}

fn fold_label(raw: &str) -> String {
    let head = raw.split('(').next().unwrap_or_default();
    head.trim().to_lowercase()
}

/// Pre-supplied coordinate pair, already range checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Validated premium request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub age: u8,
    pub vehicle_type: VehicleType,
    pub coverage_amount: f64,
    pub driving_history: DrivingHistory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Best-effort location used for the location factor.
///
/// Every field may be empty; an empty signal is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSignal {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
}

impl LocationSignal {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Resolved city, ignoring blank values returned by geocoders.
    pub fn resolved_city(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.resolved_city().is_none()
    }
}
