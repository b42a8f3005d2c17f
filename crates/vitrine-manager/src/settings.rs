use serde::{Deserialize, Serialize};

use crate::error::ManagerError;

/// User-facing view of the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
  pub turnover_always: bool,
  pub art_provider: String,
}

/// One setting change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum UserSettingUpdate {
  TurnoverAlways(bool),
  ArtProvider(String),
}

impl UserSettingUpdate {
  /// Build an update from a loosely typed key/value pair.
  pub fn parse(key: &str, value: serde_json::Value) -> Result<Self, ManagerError> {
    serde_json::from_value(serde_json::json!({ "key": key, "value": value })).map_err(|e| {
      ManagerError::InvalidSetting {
        key: key.to_string(),
        message: e.to_string(),
      }
    })
  }

  pub fn key(&self) -> &'static str {
    match self {
      UserSettingUpdate::TurnoverAlways(_) => "turnoverAlways",
      UserSettingUpdate::ArtProvider(_) => "artProvider",
    }
  }
}
