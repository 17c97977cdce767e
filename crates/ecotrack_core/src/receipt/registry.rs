//! In-process analyzer registry and start-up selection.

use crate::receipt::analyzer::{
    validate_receipt_image, AnalyzerError, AnalyzerResult, MockReceiptAnalyzer, ReceiptAnalysis,
    ReceiptAnalyzer, ReceiptImage, DEFAULT_MAX_IMAGE_BYTES,
};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Analyzer registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerRegistryError {
    InvalidProviderId(String),
    DuplicateProviderId(String),
    ProviderNotFound(String),
}

impl Display for AnalyzerRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProviderId(value) => write!(f, "analyzer id is invalid: {value}"),
            Self::DuplicateProviderId(value) => {
                write!(f, "analyzer id already registered: {value}")
            }
            Self::ProviderNotFound(value) => write!(f, "analyzer not found: {value}"),
        }
    }
}

impl Error for AnalyzerRegistryError {}

/// Registered analyzers plus the one selected at start-up.
pub struct AnalyzerRegistry {
    analyzers: BTreeMap<String, Arc<dyn ReceiptAnalyzer>>,
    active_id: Option<String>,
    max_image_bytes: u64,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self {
            analyzers: BTreeMap::new(),
            active_id: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the mock analyzer, already selected.
    pub fn with_mock() -> Self {
        let mut registry = Self::new();
        registry.analyzers.insert(
            MockReceiptAnalyzer::PROVIDER_ID.to_string(),
            Arc::new(MockReceiptAnalyzer),
        );
        registry.active_id = Some(MockReceiptAnalyzer::PROVIDER_ID.to_string());
        registry
    }

    pub fn set_max_image_bytes(&mut self, max_image_bytes: u64) {
        self.max_image_bytes = max_image_bytes;
    }

    pub fn register(
        &mut self,
        analyzer: Arc<dyn ReceiptAnalyzer>,
    ) -> Result<(), AnalyzerRegistryError> {
        let id = analyzer.provider_id().trim().to_string();
        if !is_valid_provider_id(&id) {
            return Err(AnalyzerRegistryError::InvalidProviderId(id));
        }
        if self.analyzers.contains_key(id.as_str()) {
            return Err(AnalyzerRegistryError::DuplicateProviderId(id));
        }

        self.analyzers.insert(id, analyzer);
        Ok(())
    }

    /// Sorted analyzer ids.
    pub fn provider_ids(&self) -> Vec<String> {
        self.analyzers.keys().cloned().collect()
    }

    pub fn select_active(&mut self, provider_id: &str) -> Result<(), AnalyzerRegistryError> {
        let normalized = provider_id.trim();
        if !self.analyzers.contains_key(normalized) {
            return Err(AnalyzerRegistryError::ProviderNotFound(
                normalized.to_string(),
            ));
        }
        self.active_id = Some(normalized.to_string());
        Ok(())
    }

    /// Selects `preferred` when registered, otherwise the mock analyzer.
    ///
    /// The mock is registered on demand so selection always succeeds.
    /// Returns the id that ended up active.
    pub fn select_preferred(&mut self, preferred: &str) -> &str {
        let preferred = preferred.trim();
        if self.select_active(preferred).is_err() {
            warn!(
                "event=analyzer_select module=receipt status=fallback requested={} selected={}",
                preferred,
                MockReceiptAnalyzer::PROVIDER_ID
            );
            self.analyzers
                .entry(MockReceiptAnalyzer::PROVIDER_ID.to_string())
                .or_insert_with(|| Arc::new(MockReceiptAnalyzer));
            self.active_id = Some(MockReceiptAnalyzer::PROVIDER_ID.to_string());
        } else {
            info!(
                "event=analyzer_select module=receipt status=ok selected={}",
                preferred
            );
        }
        self.active_id.as_deref().unwrap_or(MockReceiptAnalyzer::PROVIDER_ID)
    }

    pub fn active_provider_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn ReceiptAnalyzer>> {
        self.analyzers.get(provider_id.trim()).cloned()
    }

    /// Validates the image and runs the active analyzer.
    pub fn analyze_active(&self, image: &ReceiptImage) -> AnalyzerResult<ReceiptAnalysis> {
        validate_receipt_image(image, self.max_image_bytes)?;
        let analyzer = self
            .active_provider_id()
            .and_then(|id| self.get(id))
            .ok_or_else(|| {
                AnalyzerError::new(
                    "registry",
                    "analyzer_not_selected",
                    "No active receipt analyzer selected.",
                    false,
                )
            })?;
        analyzer.analyze(image)
    }
}

fn is_valid_provider_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
