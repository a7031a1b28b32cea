pub mod fallback_table;
pub mod strategies;

use std::sync::Arc;

use tracing::{info, warn};

use crate::service::common_structs::{Recommendations, UserPreferences};
use crate::service::language_model::LanguageModel;
use crate::service::spotify_service::MusicCatalog;
use fallback_table::fallback_songs;
use strategies::{AiCatalogStrategy, AiStrategy, CatalogStrategy, RecommendationStrategy};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    /// Lowercased, trimmed mood label.
    pub mood: String,
    pub preferences: UserPreferences,
}

impl RecommendationRequest {
    pub fn new(mood: &str, preferences: UserPreferences) -> Self {
        Self {
            mood: mood.trim().to_lowercase(),
            preferences,
        }
    }
}


/// Ranked recommendation chain. The first strategy producing a non-empty list
/// wins; the static table answers when every strategy fails.
#[derive(Clone)]
pub struct RecommendationService {
    strategies: Vec<Arc<dyn RecommendationStrategy>>,
}

impl RecommendationService {
    pub fn new(model: Option<Arc<dyn LanguageModel>>, catalog: Option<Arc<dyn MusicCatalog>>) -> Self {
        let mut strategies: Vec<Arc<dyn RecommendationStrategy>> = vec![];
        if let (Some(model), Some(catalog)) = (&model, &catalog) {
            strategies.push(Arc::new(AiCatalogStrategy::new(model.clone(), catalog.clone())));
        }
        if let Some(catalog) = catalog {
            strategies.push(Arc::new(CatalogStrategy::new(catalog)));
        }
        if let Some(model) = model {
            strategies.push(Arc::new(AiStrategy::new(model)));
        }
        Self::with_strategies(strategies)
    }

    pub fn with_strategies(strategies: Vec<Arc<dyn RecommendationStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn recommend(&self, mood: &str, preferences: &UserPreferences) -> Recommendations {
        let request = RecommendationRequest::new(mood, preferences.clone());

        for strategy in &self.strategies {
            match strategy.recommend(&request).await {
                Ok(songs) if !songs.is_empty() => {
                    info!(strategy = strategy.name(), mood = %request.mood, count = songs.len(), "recommendations ready");
                    return Recommendations {
                        songs,
                        ai_powered: strategy.ai_powered(),
                        spotify_powered: strategy.spotify_powered(),
                    };
                }
                Ok(_) => warn!(strategy = strategy.name(), mood = %request.mood, "strategy returned no songs"),
                Err(error) => warn!(strategy = strategy.name(), mood = %request.mood, error = %error, "strategy failed"),
            }
        }

        info!(mood = %request.mood, "using static recommendations");
        Recommendations {
            songs: fallback_songs(&request.mood),
            ai_powered: false,
            spotify_powered: false,
        }
    }
}
