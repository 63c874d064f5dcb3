use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanRemedy {
    pub name: String,
    pub mean_quantity: f64,
}

/// Aggregate statistics over every logged headache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadacheStats {
    pub occurrences: u64,
    pub mean_duration: Option<f64>,
    /// The API sends either the level number or its name
    #[serde(default, deserialize_with = "deserialize_text_or_number")]
    pub most_common_intensity: Option<String>,
    #[serde(default)]
    pub mean_remedies: Vec<MeanRemedy>,
    pub most_common_remedy_result: Option<String>,
    pub most_common_side: Option<String>,
    pub most_common_side_name: Option<String>,
    pub mean_temperature: Option<f64>,
    pub mean_apparent_temperature: Option<f64>,
    pub mean_uv_index: Option<f64>,
    pub mean_shortwave_radiation: Option<f64>,
    pub mean_min_temperature: Option<f64>,
    pub mean_max_temperature: Option<f64>,
    pub mean_apparent_min_temperature: Option<f64>,
    pub mean_apparent_max_temperature: Option<f64>,
}

fn deserialize_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
