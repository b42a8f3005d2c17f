use std::sync::Arc;

use serde::Serialize;
use vitrine_config::VitrineConfig;

use crate::context::ProviderContext;
use crate::error::RegistryError;
use crate::gallery::GalleryProvider;
use crate::museum::MuseumProvider;
use crate::provider::ArtProvider;

/// Name and display name of a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
  pub name: String,
  pub display_name: String,
}

/// The fixed set of providers, in registration order.
///
/// Built once and never mutated. The first provider is the default.
#[derive(Clone)]
pub struct ProviderRegistry {
  providers: Vec<Arc<dyn ArtProvider>>,
}

impl ProviderRegistry {
  pub fn new(providers: Vec<Arc<dyn ArtProvider>>) -> Result<Self, RegistryError> {
    if providers.is_empty() {
      return Err(RegistryError::Empty);
    }

    for (i, provider) in providers.iter().enumerate() {
      if providers[..i].iter().any(|p| p.name() == provider.name()) {
        return Err(RegistryError::Duplicate {
          name: provider.name().to_string(),
        });
      }
    }

    Ok(Self { providers })
  }

  /// The gallery provider (default) followed by the museum provider.
  pub fn from_config(ctx: ProviderContext, config: &VitrineConfig) -> Self {
    Self {
      providers: vec![
        Arc::new(GalleryProvider::new(ctx.clone(), &config.gallery)),
        Arc::new(MuseumProvider::new(ctx, &config.museum)),
      ],
    }
  }

  pub fn get(&self, name: &str) -> Option<&Arc<dyn ArtProvider>> {
    self.providers.iter().find(|p| p.name() == name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  /// The first registered provider.
  pub fn default_provider(&self) -> &Arc<dyn ArtProvider> {
    &self.providers[0]
  }

  pub fn entries(&self) -> Vec<ProviderInfo> {
    self
      .providers
      .iter()
      .map(|p| ProviderInfo {
        name: p.name().to_string(),
        display_name: p.display_name().to_string(),
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::Harness;
  use vitrine_test_utils::ScriptedFetcher;

  #[test]
  fn test_from_config_order_and_default() {
    let harness = Harness::new(ScriptedFetcher::new());
    let registry = ProviderRegistry::from_config(harness.context(), &VitrineConfig::default());

    assert_eq!(registry.default_provider().name(), "google-arts");
    assert_eq!(
      registry.entries(),
      vec![
        ProviderInfo {
          name: "google-arts".to_string(),
          display_name: "Google Arts & Culture".to_string(),
        },
        ProviderInfo {
          name: "met-museum".to_string(),
          display_name: "Metropolitan Museum of Art".to_string(),
        },
      ]
    );
    assert!(registry.contains("met-museum"));
    assert!(registry.get("louvre").is_none());
  }

  #[test]
  fn test_rejects_empty_and_duplicates() {
    assert!(matches!(ProviderRegistry::new(vec![]), Err(RegistryError::Empty)));

    let harness = Harness::new(ScriptedFetcher::new());
    let config = VitrineConfig::default();
    let providers: Vec<Arc<dyn ArtProvider>> = vec![
      Arc::new(GalleryProvider::new(harness.context(), &config.gallery)),
      Arc::new(GalleryProvider::new(harness.context(), &config.gallery)),
    ];
    assert!(matches!(
      ProviderRegistry::new(providers),
      Err(RegistryError::Duplicate { name }) if name == "google-arts"
    ));
  }
}
