//! Message contract between foreground contexts and the coordinator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vitrine_asset::Asset;
use vitrine_manager::UserSettings;

use crate::error::CoordinatorError;

/// A command sent to the coordinator, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
  /// Advance to the next displayable asset. `currentIndex` is what the
  /// sender was showing; it is informational only.
  RotateToNext {
    #[serde(
      rename = "currentIndex",
      default,
      skip_serializing_if = "Option::is_none"
    )]
    current_index: Option<usize>,
  },

  SwitchProvider {
    #[serde(rename = "providerName")]
    provider_name: String,
  },

  UpdateSetting { key: String, value: Value },

  RequestCurrentAsset,

  GetCurrentArt,
}

impl Command {
  const KINDS: [&'static str; 5] = [
    "rotate-to-next",
    "switch-provider",
    "update-setting",
    "request-current-asset",
    "get-current-art",
  ];

  /// Parse a JSON message, rejecting unrecognized `type` tags.
  pub fn from_json(json: &str) -> Result<Self, CoordinatorError> {
    let value: Value = serde_json::from_str(json).map_err(|e| CoordinatorError::InvalidPayload {
      kind: String::new(),
      message: e.to_string(),
    })?;

    let kind = value
      .get("type")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();
    if !Self::KINDS.contains(&kind.as_str()) {
      return Err(CoordinatorError::UnknownCommand { kind });
    }

    serde_json::from_value(value).map_err(|e| CoordinatorError::InvalidPayload {
      kind,
      message: e.to_string(),
    })
  }

  /// The `type` tag.
  pub fn kind(&self) -> &'static str {
    match self {
      Command::RotateToNext { .. } => Self::KINDS[0],
      Command::SwitchProvider { .. } => Self::KINDS[1],
      Command::UpdateSetting { .. } => Self::KINDS[2],
      Command::RequestCurrentAsset => Self::KINDS[3],
      Command::GetCurrentArt => Self::KINDS[4],
    }
  }
}

/// Everything a foreground context needs to render the current artwork.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentArt {
  pub asset: Asset,
  pub image_url: Option<String>,
  pub total_assets: usize,
  pub current_index: usize,
}

/// Reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
  CurrentIndex {
    #[serde(rename = "currentIndex")]
    current_index: usize,
  },
  CurrentArt(CurrentArt),
  Settings(UserSettings),
  Error {
    error: String,
  },
}

/// Published to every foreground context after the current asset changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
  AssetUpdated {
    #[serde(rename = "newIndex")]
    new_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asset: Option<Asset>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(rename = "totalAssets", default, skip_serializing_if = "Option::is_none")]
    total_assets: Option<usize>,
  },
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_commands() {
    assert_eq!(
      Command::from_json(r#"{"type":"rotate-to-next","currentIndex":4}"#).unwrap(),
      Command::RotateToNext {
        current_index: Some(4)
      }
    );
    assert_eq!(
      Command::from_json(r#"{"type":"rotate-to-next"}"#).unwrap(),
      Command::RotateToNext {
        current_index: None
      }
    );
    assert_eq!(
      Command::from_json(r#"{"type":"switch-provider","providerName":"met-museum"}"#).unwrap(),
      Command::SwitchProvider {
        provider_name: "met-museum".to_string()
      }
    );
    assert_eq!(
      Command::from_json(r#"{"type":"update-setting","key":"turnoverAlways","value":true}"#)
        .unwrap(),
      Command::UpdateSetting {
        key: "turnoverAlways".to_string(),
        value: json!(true)
      }
    );
    assert_eq!(
      Command::from_json(r#"{"type":"get-current-art"}"#).unwrap(),
      Command::GetCurrentArt
    );
    assert_eq!(
      Command::from_json(r#"{"type":"request-current-asset"}"#)
        .unwrap()
        .kind(),
      "request-current-asset"
    );
  }

  #[test]
  fn test_unknown_type_is_rejected() {
    let err = Command::from_json(r#"{"type":"artUpdated"}"#).unwrap_err();
    assert!(matches!(err, CoordinatorError::UnknownCommand { kind } if kind == "artUpdated"));

    assert!(matches!(
      Command::from_json(r#"{"providerName":"x"}"#),
      Err(CoordinatorError::UnknownCommand { .. })
    ));
  }

  #[test]
  fn test_bad_payload_is_rejected() {
    assert!(matches!(
      Command::from_json(r#"{"type":"switch-provider"}"#),
      Err(CoordinatorError::InvalidPayload { kind, .. }) if kind == "switch-provider"
    ));
    assert!(matches!(
      Command::from_json("not json"),
      Err(CoordinatorError::InvalidPayload { .. })
    ));
  }

  #[test]
  fn test_reply_shapes() {
    assert_eq!(
      serde_json::to_value(Reply::CurrentIndex { current_index: 2 }).unwrap(),
      json!({ "currentIndex": 2 })
    );
    assert_eq!(
      serde_json::to_value(Reply::Error {
        error: "No valid assets available".to_string()
      })
      .unwrap(),
      json!({ "error": "No valid assets available" })
    );
  }

  #[test]
  fn test_notification_shape() {
    let notification = Notification::AssetUpdated {
      new_index: 1,
      asset: None,
      image_url: Some("https://images.test/1.jpg".to_string()),
      total_assets: Some(3),
    };

    assert_eq!(
      serde_json::to_value(&notification).unwrap(),
      json!({
        "type": "asset-updated",
        "newIndex": 1,
        "imageUrl": "https://images.test/1.jpg",
        "totalAssets": 3,
      })
    );
  }
}
