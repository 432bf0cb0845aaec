//! ECB SDMX-JSON response types, reduced to the path holding the rate.
//!
//! Observations are keyed by stringified indices (`"0"`, `"1"`, ...) and map
//! to arrays whose first element is the rate; the remaining elements are
//! attribute indices and may be `null`.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EcbResponse {
    #[serde(rename = "dataSets", default)]
    pub data_sets: Vec<EcbDataSet>,
}

#[derive(Debug, Deserialize)]
pub struct EcbDataSet {
    #[serde(default)]
    pub series: HashMap<String, EcbSeries>,
}

#[derive(Debug, Deserialize)]
pub struct EcbSeries {
    #[serde(default)]
    pub observations: HashMap<String, Vec<Option<serde_json::Number>>>,
}

impl EcbResponse {
    /// Key of the single series returned for a fully specified series key.
    pub const SERIES_KEY: &'static str = "0:0:0:0:0";

    /// First value of the observation with the highest index, i.e. the most
    /// recent daily rate in the requested window.
    #[must_use]
    pub fn latest_value(&self) -> Option<&serde_json::Number> {
        let series = self.data_sets.first()?.series.get(Self::SERIES_KEY)?;
        series
            .observations
            .iter()
            .filter_map(|(key, values)| Some((key.parse::<u32>().ok()?, values)))
            .max_by_key(|(index, _)| *index)
            .and_then(|(_, values)| values.first())
            .and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(observations: serde_json::Value) -> EcbResponse {
        serde_json::from_value(serde_json::json!({
            "dataSets": [{
                "action": "Replace",
                "series": { "0:0:0:0:0": { "attributes": [0, null], "observations": observations } }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn latest_uses_numeric_index_order() {
        let data = response(serde_json::json!({
            "2": [1.0834, 0, 0, null, null],
            "10": [1.0912, 0, 0, null, null],
            "9": [1.0801, 0, 0, null, null]
        }));
        assert_eq!(data.latest_value().unwrap().to_string(), "1.0912");
    }

    #[test]
    fn missing_series_yields_none() {
        let data: EcbResponse = serde_json::from_value(serde_json::json!({ "dataSets": [] })).unwrap();
        assert!(data.latest_value().is_none());
    }

    #[test]
    fn null_rate_yields_none() {
        let data = response(serde_json::json!({ "0": [null, 0] }));
        assert!(data.latest_value().is_none());
    }
}
