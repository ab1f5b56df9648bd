//! Request models for the tool-call API
//!
//! Parses a tool name plus its JSON arguments into a typed `ToolCall`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{F1Error, Result};

/// Every tool the server exposes, in listing order.
pub const TOOL_NAMES: [&str; 19] = [
    "getLiveTimingData",
    "getCurrentSessionStatus",
    "getDriverInfo",
    "getHistoricRaceResults",
    "getDriverStandings",
    "getConstructorStandings",
    "getLapTimes",
    "getWeatherData",
    "getCarData",
    "getPitStopData",
    "getTeamRadio",
    "getRaceControlMessages",
    "getRaceCalendar",
    "getCircuitInfo",
    "getSeasonList",
    "getQualifyingResults",
    "getDriverInformation",
    "getConstructorInformation",
    "clearCache",
];

// == Argument Shapes ==

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverArgs {
    pub driver_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearArgs {
    pub year: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RaceArgs {
    pub year: u32,
    pub round: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapTimesArgs {
    pub year: u32,
    pub round: u32,
    pub driver_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionArgs {
    #[serde(default)]
    pub session_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDataArgs {
    pub driver_number: String,
    #[serde(default)]
    pub session_key: Option<String>,
    /// Extra OpenF1 query terms, e.g. `speed>=315`
    #[serde(default)]
    pub filters: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDriverArgs {
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default)]
    pub driver_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitArgs {
    pub circuit_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorArgs {
    pub constructor_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SeasonListArgs {
    #[serde(default)]
    pub limit: Option<u32>,
}

// == Tool Call ==
/// A parsed, validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    LiveTimingData,
    CurrentSessionStatus,
    DriverInfo(DriverArgs),
    HistoricRaceResults(RaceArgs),
    DriverStandings(YearArgs),
    ConstructorStandings(YearArgs),
    LapTimes(LapTimesArgs),
    WeatherData(SessionArgs),
    CarData(CarDataArgs),
    PitStopData(SessionDriverArgs),
    TeamRadio(SessionDriverArgs),
    RaceControlMessages(SessionArgs),
    RaceCalendar(YearArgs),
    CircuitInfo(CircuitArgs),
    SeasonList(SeasonListArgs),
    QualifyingResults(RaceArgs),
    DriverInformation(DriverArgs),
    ConstructorInformation(ConstructorArgs),
    ClearCache,
}

impl ToolCall {
    /// Parses `args` according to the tool registered under `name`.
    ///
    /// A `null` argument value is treated as an empty object.
    pub fn parse(name: &str, args: Value) -> Result<Self> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };

        let call = match name {
            "getLiveTimingData" => ToolCall::LiveTimingData,
            "getCurrentSessionStatus" => ToolCall::CurrentSessionStatus,
            "getDriverInfo" => ToolCall::DriverInfo(parse_args(name, args)?),
            "getHistoricRaceResults" => ToolCall::HistoricRaceResults(parse_args(name, args)?),
            "getDriverStandings" => ToolCall::DriverStandings(parse_args(name, args)?),
            "getConstructorStandings" => ToolCall::ConstructorStandings(parse_args(name, args)?),
            "getLapTimes" => ToolCall::LapTimes(parse_args(name, args)?),
            "getWeatherData" => ToolCall::WeatherData(parse_args(name, args)?),
            "getCarData" => ToolCall::CarData(parse_args(name, args)?),
            "getPitStopData" => ToolCall::PitStopData(parse_args(name, args)?),
            "getTeamRadio" => ToolCall::TeamRadio(parse_args(name, args)?),
            "getRaceControlMessages" => ToolCall::RaceControlMessages(parse_args(name, args)?),
            "getRaceCalendar" => ToolCall::RaceCalendar(parse_args(name, args)?),
            "getCircuitInfo" => ToolCall::CircuitInfo(parse_args(name, args)?),
            "getSeasonList" => ToolCall::SeasonList(parse_args(name, args)?),
            "getQualifyingResults" => ToolCall::QualifyingResults(parse_args(name, args)?),
            "getDriverInformation" => ToolCall::DriverInformation(parse_args(name, args)?),
            "getConstructorInformation" => {
                ToolCall::ConstructorInformation(parse_args(name, args)?)
            }
            "clearCache" => ToolCall::ClearCache,
            other => return Err(F1Error::UnknownTool(other.to_string())),
        };

        match call.validate() {
            Some(message) => Err(F1Error::InvalidParams(format!("{}: {}", name, message))),
            None => Ok(call),
        }
    }

    /// Validates argument values that the type system cannot express.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let (field, value) = match self {
            ToolCall::DriverInfo(args) | ToolCall::DriverInformation(args) => {
                ("driverId", args.driver_id.as_str())
            }
            ToolCall::LapTimes(args) => ("driverId", args.driver_id.as_str()),
            ToolCall::CarData(args) => ("driverNumber", args.driver_number.as_str()),
            ToolCall::CircuitInfo(args) => ("circuitId", args.circuit_id.as_str()),
            ToolCall::ConstructorInformation(args) => {
                ("constructorId", args.constructor_id.as_str())
            }
            ToolCall::SeasonList(SeasonListArgs { limit: Some(0) }) => {
                return Some("limit must be at least 1".to_string())
            }
            _ => return None,
        };

        if value.trim().is_empty() {
            Some(format!("{} cannot be empty", field))
        } else {
            None
        }
    }
}

fn parse_args<T: DeserializeOwned>(name: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| F1Error::InvalidParams(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_every_listed_tool_name() {
        let args = json!({
            "driverId": "max_verstappen",
            "driverNumber": "1",
            "year": 2023,
            "round": 1,
            "circuitId": "monza",
            "constructorId": "ferrari",
        });
        for name in TOOL_NAMES {
            assert!(
                ToolCall::parse(name, args.clone()).is_ok(),
                "{} should parse",
                name
            );
        }
    }

    #[test]
    fn test_parse_camel_case_args() {
        let call = ToolCall::parse(
            "getLapTimes",
            json!({"year": 2023, "round": 5, "driverId": "alonso"}),
        )
        .unwrap();

        assert_eq!(
            call,
            ToolCall::LapTimes(LapTimesArgs {
                year: 2023,
                round: 5,
                driver_id: "alonso".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_null_args_for_optional_tools() {
        let call = ToolCall::parse("getWeatherData", Value::Null).unwrap();
        assert_eq!(call, ToolCall::WeatherData(SessionArgs::default()));

        let call = ToolCall::parse("clearCache", Value::Null).unwrap();
        assert_eq!(call, ToolCall::ClearCache);
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = ToolCall::parse("getTyreStrategy", json!({})).unwrap_err();
        assert!(matches!(err, F1Error::UnknownTool(name) if name == "getTyreStrategy"));
    }

    #[test]
    fn test_parse_missing_required_arg() {
        let err = ToolCall::parse("getDriverStandings", json!({})).unwrap_err();
        assert!(matches!(err, F1Error::InvalidParams(_)));
    }

    #[test]
    fn test_parse_wrong_type() {
        let err = ToolCall::parse("getRaceCalendar", json!({"year": "2023"})).unwrap_err();
        assert!(matches!(err, F1Error::InvalidParams(_)));
    }

    #[test]
    fn test_validate_blank_identifier() {
        let err = ToolCall::parse("getCircuitInfo", json!({"circuitId": "  "})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameters: getCircuitInfo: circuitId cannot be empty"
        );
    }

    #[test]
    fn test_validate_zero_season_limit() {
        let err = ToolCall::parse("getSeasonList", json!({"limit": 0})).unwrap_err();
        assert!(matches!(err, F1Error::InvalidParams(_)));
    }
}
