use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Drink, Food, Remedy};

/// Headache intensity on the journal's three-point scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Intensity {
    /// Does not interfere with activities
    Weak = 1,
    /// Interferes with but does not prevent activities
    Moderate = 2,
    /// Prevents activities
    Strong = 3,
}

impl Intensity {
    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Intensity::Weak => "Weak",
            Intensity::Moderate => "Moderate",
            Intensity::Strong => "Strong",
        }
    }
}

impl TryFrom<u8> for Intensity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Intensity::Weak),
            2 => Ok(Intensity::Moderate),
            3 => Ok(Intensity::Strong),
            other => Err(format!("intensity must be between 1 and 3, got {}", other)),
        }
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.level()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Both,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
            Side::Both => write!(f, "Both"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            "both" => Ok(Side::Both),
            other => Err(format!("side must be left, right or both, got '{}'", other)),
        }
    }
}

/// How well a remedy worked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemedyResult {
    #[serde(rename = "-")]
    NoRelief,
    #[serde(rename = "+")]
    Relief,
    #[serde(rename = "++")]
    FullRelief,
}

impl RemedyResult {
    pub fn symbol(&self) -> &'static str {
        match self {
            RemedyResult::NoRelief => "-",
            RemedyResult::Relief => "+",
            RemedyResult::FullRelief => "++",
        }
    }
}

impl std::str::FromStr for RemedyResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(RemedyResult::NoRelief),
            "+" => Ok(RemedyResult::Relief),
            "++" => Ok(RemedyResult::FullRelief),
            other => Err(format!("result must be -, + or ++, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub id: String,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub apparent_min_temperature: Option<f64>,
    pub apparent_max_temperature: Option<f64>,
    pub uv_index: Option<f64>,
    pub shortwave_radiation: Option<f64>,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadacheRemedy {
    pub id: String,
    pub quantity: u32,
    /// Unrated until the user reports how it went
    #[serde(default, deserialize_with = "deserialize_remedy_result")]
    pub result: Option<RemedyResult>,
    pub remedy: Remedy,
}

/// Unknown or empty result strings are treated as "not rated yet"
fn deserialize_remedy_result<'de, D>(deserializer: D) -> Result<Option<RemedyResult>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadacheLog {
    pub id: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: Option<DateTime<Utc>>,
    pub intensity: Intensity,
    #[serde(default)]
    pub intensity_name: Option<String>,
    pub side: Side,
    #[serde(default)]
    pub pressure_or_squeezing: bool,
    #[serde(default)]
    pub throbbing_or_pulsating: bool,
    #[serde(default)]
    pub stabbing: bool,
    #[serde(default)]
    pub nausea_vomiting: bool,
    #[serde(default)]
    pub light_sensitivity: bool,
    #[serde(default)]
    pub noise_sensitivity: bool,
    #[serde(default)]
    pub sleep_rank: u8,
    pub duration_in_seconds: Option<i64>,
    pub weather: Option<Weather>,
    #[serde(default)]
    pub remedies: Vec<HeadacheRemedy>,
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub drinks: Vec<Drink>,
}

impl HeadacheLog {
    pub fn is_ongoing(&self) -> bool {
        self.end_timestamp.is_none()
    }

    /// Server-reported name, falling back to the scale label
    pub fn intensity_display(&self) -> &str {
        self.intensity_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.intensity.display_name())
    }

    /// Labels for the symptoms flagged on this entry
    pub fn symptoms(&self) -> Vec<&'static str> {
        [
            (self.pressure_or_squeezing, "pressure/squeezing"),
            (self.throbbing_or_pulsating, "throbbing/pulsating"),
            (self.stabbing, "stabbing"),
            (self.nausea_vomiting, "nausea/vomiting"),
            (self.light_sensitivity, "light sensitivity"),
            (self.noise_sensitivity, "noise sensitivity"),
        ]
        .into_iter()
        .filter_map(|(flag, label)| flag.then_some(label))
        .collect()
    }
}

/// Maximum sleep rank accepted by the journal
pub const MAX_SLEEP_RANK: u8 = 100;

/// Payload for `POST /headaches`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHeadache {
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: Option<DateTime<Utc>>,
    pub intensity: Intensity,
    pub side: Side,
    pub pressure_or_squeezing: bool,
    pub throbbing_or_pulsating: bool,
    pub stabbing: bool,
    pub nausea_vomiting: bool,
    pub light_sensitivity: bool,
    pub noise_sensitivity: bool,
    pub sleep_rank: u8,
}

impl NewHeadache {
    /// A headache starting now with the journal's form defaults
    pub fn starting_now(side: Side) -> Self {
        Self {
            start_timestamp: Utc::now(),
            end_timestamp: None,
            intensity: Intensity::Weak,
            side,
            pressure_or_squeezing: false,
            throbbing_or_pulsating: false,
            stabbing: false,
            nausea_vomiting: false,
            light_sensitivity: false,
            noise_sensitivity: false,
            sleep_rank: 0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sleep_rank > MAX_SLEEP_RANK {
            return Err(format!(
                "sleep rank must be between 0 and {}, got {}",
                MAX_SLEEP_RANK, self.sleep_rank
            ));
        }
        if let Some(end) = self.end_timestamp {
            if end < self.start_timestamp {
                return Err("end time must not be before start time".to_string());
            }
        }
        Ok(())
    }
}

/// Where the user was when logging a headache, used server-side for weather
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG_JSON: &str = r#"{
        "id": "7f0c",
        "startTimestamp": "2024-03-01T08:30:00Z",
        "endTimestamp": "2024-03-01T10:00:00Z",
        "intensity": 2,
        "intensityName": "Moderate",
        "side": "left",
        "pressureOrSqueezing": true,
        "throbbingOrPulsating": false,
        "stabbing": false,
        "nauseaVomiting": true,
        "lightSensitivity": false,
        "noiseSensitivity": false,
        "sleepRank": 70,
        "durationInSeconds": 5400,
        "weather": {
            "id": "w1",
            "minTemperature": 12.5,
            "maxTemperature": 21.0,
            "apparentMinTemperature": 11.0,
            "apparentMaxTemperature": 20.0,
            "uvIndex": 4.0,
            "shortwaveRadiation": 180.0,
            "temperature": 17.2,
            "apparentTemperature": 16.8
        },
        "remedies": [
            {"id": "hr1", "quantity": 2, "result": "++", "remedy": {"id": "r1", "name": "Ibuprofen"}},
            {"id": "hr2", "quantity": 1, "result": null, "remedy": {"id": "r2", "name": "Water"}}
        ],
        "foods": [{"id": "f1", "name": "Cheese"}],
        "drinks": []
    }"#;

    #[test]
    fn test_parse_headache_log() {
        let log: HeadacheLog = serde_json::from_str(LOG_JSON).unwrap();
        assert_eq!(log.intensity, Intensity::Moderate);
        assert_eq!(log.side, Side::Left);
        assert_eq!(log.duration_in_seconds, Some(5400));
        assert!(!log.is_ongoing());
        assert_eq!(log.symptoms(), vec!["pressure/squeezing", "nausea/vomiting"]);
        assert_eq!(log.remedies[0].result, Some(RemedyResult::FullRelief));
        assert_eq!(log.remedies[1].result, None);
        assert_eq!(log.foods[0].name, "Cheese");
        assert_eq!(log.weather.as_ref().and_then(|w| w.uv_index), Some(4.0));
    }

    #[test]
    fn test_parse_ongoing_headache() {
        let json = r#"{
            "id": "a", "startTimestamp": "2024-03-01T08:30:00Z", "endTimestamp": null,
            "intensity": 3, "side": "both", "durationInSeconds": null, "weather": null
        }"#;
        let log: HeadacheLog = serde_json::from_str(json).unwrap();
        assert!(log.is_ongoing());
        assert_eq!(log.intensity_display(), "Strong");
        assert!(log.symptoms().is_empty());
    }

    #[test]
    fn test_intensity_out_of_range_rejected() {
        assert!(serde_json::from_str::<Intensity>("0").is_err());
        assert!(serde_json::from_str::<Intensity>("4").is_err());
        assert_eq!(serde_json::from_str::<Intensity>("1").unwrap(), Intensity::Weak);
        assert_eq!(serde_json::to_string(&Intensity::Strong).unwrap(), "3");
    }

    #[test]
    fn test_new_headache_wire_format() {
        let mut entry = NewHeadache::starting_now(Side::Right);
        entry.stabbing = true;
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["intensity"], 1);
        assert_eq!(value["side"], "right");
        assert_eq!(value["stabbing"], true);
        assert_eq!(value["sleepRank"], 0);
        assert!(value["endTimestamp"].is_null());
        assert!(value.get("startTimestamp").is_some());
    }

    #[test]
    fn test_new_headache_validation() {
        let mut entry = NewHeadache::starting_now(Side::Left);
        assert!(entry.validate().is_ok());

        entry.sleep_rank = 101;
        assert!(entry.validate().is_err());

        entry.sleep_rank = 100;
        entry.end_timestamp = Some(entry.start_timestamp - chrono::Duration::minutes(5));
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_remedy_result_symbols() {
        assert_eq!("++".parse::<RemedyResult>().unwrap(), RemedyResult::FullRelief);
        assert_eq!(serde_json::to_string(&RemedyResult::Relief).unwrap(), r#""+""#);
        assert!("+++".parse::<RemedyResult>().is_err());
    }
}
