use std::sync::Arc;

use quiz_core::model::QuizSource;
use quiz_core::registry;
use storage::repository::{QuizRecord, QuizStore};
use tracing::{info, warn};

use crate::error::CatalogError;

/// A quiz bank left out of the catalog, with the reason.
#[derive(Debug)]
pub struct RejectedBank {
    pub label: String,
    pub error: CatalogError,
}

/// Every playable quiz source, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    sources: Vec<Arc<QuizSource>>,
    rejected: Arc<Vec<RejectedBank>>,
}

impl QuizCatalog {
    /// Load every static bank and add the built-in generators.
    ///
    /// A bank that cannot be loaded is skipped and listed in `rejected`; it never makes
    /// the whole catalog fail.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Source` if a built-in generator cannot be constructed.
    pub async fn load(stores: &[Arc<dyn QuizStore>]) -> Result<Self, CatalogError> {
        let mut sources = Vec::with_capacity(stores.len() + registry::GENERATORS.len());
        let mut rejected = Vec::new();

        for store in stores {
            let label = store.label();
            match load_static(store.as_ref()).await {
                Ok(source) => {
                    info!(bank = %label, name = source.name(), "quiz bank loaded");
                    sources.push(source);
                }
                Err(error) => {
                    warn!(bank = %label, %error, "quiz bank rejected");
                    rejected.push(RejectedBank { label, error });
                }
            }
        }
        sources.extend(registry::build_all()?);

        let mut catalog = Self::from_sources(sources);
        catalog.rejected = Arc::new(rejected);
        info!(
            sources = catalog.len(),
            rejected = catalog.rejected.len(),
            "quiz catalog ready"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn from_sources(sources: Vec<QuizSource>) -> Self {
        let mut sources: Vec<Arc<QuizSource>> = sources.into_iter().map(Arc::new).collect();
        sources.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            sources,
            rejected: Arc::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[Arc<QuizSource>] {
        &self.sources
    }

    #[must_use]
    pub fn rejected(&self) -> &[RejectedBank] {
        &self.rejected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Find a source by exact name, or by its 1-based position in the list.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<Arc<QuizSource>> {
        let key = key.trim();
        if let Some(source) = self.sources.iter().find(|s| s.name() == key) {
            return Some(Arc::clone(source));
        }
        let index: usize = key.parse().ok()?;
        index
            .checked_sub(1)
            .and_then(|i| self.sources.get(i))
            .map(Arc::clone)
    }
}

async fn load_static(store: &dyn QuizStore) -> Result<QuizSource, CatalogError> {
    let overview = store.list_overview().await?;
    let quizzes = store
        .load_all()
        .await?
        .into_iter()
        .map(QuizRecord::into_quiz)
        .collect();
    Ok(QuizSource::from_pool(Some(overview), quizzes)?)
}
