use serde::{Deserialize, Serialize};

/// Durable store key of the serialized [`ArtState`].
pub const ART_STATE_KEY: &str = "art_state";

/// The persisted rotation state.
///
/// `current_index` is only meaningful for `provider`; the two always change
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtState {
  pub provider: String,
  pub current_index: usize,
  pub turnover_always: bool,
  /// Epoch milliseconds of the last mutation.
  pub last_updated: i64,
}

impl ArtState {
  pub fn new(provider: impl Into<String>, now_ms: i64) -> Self {
    Self {
      provider: provider.into(),
      current_index: 0,
      turnover_always: false,
      last_updated: now_ms,
    }
  }

  /// Overlay whatever fields `json` carries onto `self`.
  pub(crate) fn merge_json(self, json: &str) -> Result<Self, serde_json::Error> {
    let stored: StoredState = serde_json::from_str(json)?;
    Ok(Self {
      provider: stored.provider.unwrap_or(self.provider),
      current_index: stored
        .current_index
        .map_or(self.current_index, |i| usize::try_from(i).unwrap_or(0)),
      turnover_always: stored.turnover_always.unwrap_or(self.turnover_always),
      last_updated: stored.last_updated.unwrap_or(self.last_updated),
    })
  }
}

/// What may be found under [`ART_STATE_KEY`]; older writers omit fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
  provider: Option<String>,
  current_index: Option<i64>,
  turnover_always: Option<bool>,
  last_updated: Option<i64>,
}
