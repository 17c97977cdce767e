//! Analyzer contract, result types and the offline mock.

use crate::model::event::CarbonEventInput;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upload size accepted when configuration does not say otherwise.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Uniform failure envelope for all analyzer providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerError {
    pub provider_id: String,
    /// Stable machine-readable code, e.g. `image_too_large`.
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl AnalyzerError {
    pub fn new(
        provider_id: impl Into<String>,
        code: &'static str,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            code,
            message: message.into(),
            retryable,
        }
    }
}

impl Display for AnalyzerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider_id, self.code, self.message)
    }
}

impl Error for AnalyzerError {}

/// Uploaded receipt photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Checks MIME type and size before the image leaves the process.
pub fn validate_receipt_image(image: &ReceiptImage, max_bytes: u64) -> AnalyzerResult<()> {
    if !image.mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(AnalyzerError::new(
            "validation",
            "unsupported_media_type",
            "File must be an image",
            false,
        ));
    }
    if image.bytes.is_empty() {
        return Err(AnalyzerError::new(
            "validation",
            "empty_image",
            "No file provided",
            false,
        ));
    }
    let size = u64::try_from(image.bytes.len()).unwrap_or(u64::MAX);
    if size > max_bytes {
        return Err(AnalyzerError::new(
            "validation",
            "image_too_large",
            format!("File size must be at most {max_bytes} bytes, got {size}"),
            false,
        ));
    }
    Ok(())
}

/// One line item recognized on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: f64,
    pub price: f64,
    pub category: String,
    pub subcategory: Option<String>,
    pub carbon_impact: f64,
}

/// Itemized estimate returned by an analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptAnalysis {
    pub items: Vec<ReceiptItem>,
    /// Receipt total in currency units.
    pub total: f64,
    pub carbon_impact: f64,
    pub category: String,
    /// Provider confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ReceiptAnalysis {
    /// Builds an analysis whose totals are the sums over `items`.
    pub fn from_items(items: Vec<ReceiptItem>, category: impl Into<String>, confidence: f64) -> Self {
        let total = items.iter().map(|item| item.price).sum();
        let carbon_impact = items.iter().map(|item| item.carbon_impact).sum();
        Self {
            items,
            total,
            carbon_impact,
            category: category.into(),
            confidence,
        }
    }

    /// The single purchase event this receipt contributes.
    pub fn to_event_input(
        &self,
        user_id: impl Into<String>,
        occurred_at: NaiveDateTime,
    ) -> CarbonEventInput {
        let names = self
            .items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        CarbonEventInput::new(user_id, occurred_at, self.category.as_str(), self.carbon_impact)
            .with_amount(self.total)
            .with_description(format!("Receipt: {names}"))
    }
}

/// One receipt analysis backend (vendor API or mock).
pub trait ReceiptAnalyzer: Send + Sync {
    /// Stable lowercase id such as `openai` or `mock`.
    fn provider_id(&self) -> &str;
    fn analyze(&self, image: &ReceiptImage) -> AnalyzerResult<ReceiptAnalysis>;
}

/// Offline analyzer returning a fixed grocery receipt.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockReceiptAnalyzer;

impl MockReceiptAnalyzer {
    pub const PROVIDER_ID: &'static str = "mock";
}

impl ReceiptAnalyzer for MockReceiptAnalyzer {
    fn provider_id(&self) -> &str {
        Self::PROVIDER_ID
    }

    fn analyze(&self, _image: &ReceiptImage) -> AnalyzerResult<ReceiptAnalysis> {
        let items = vec![
            grocery_item("Organic Bananas", 2.0, 3.99, "fruits", 0.8),
            grocery_item("Almond Milk", 1.0, 4.49, "dairy", 1.2),
            grocery_item("Whole Grain Bread", 1.0, 2.99, "grains", 0.9),
        ];
        Ok(ReceiptAnalysis::from_items(items, "food", 0.95))
    }
}

fn grocery_item(
    name: &str,
    quantity: f64,
    price: f64,
    subcategory: &str,
    carbon_impact: f64,
) -> ReceiptItem {
    ReceiptItem {
        name: name.to_string(),
        quantity,
        price,
        category: "food".to_string(),
        subcategory: Some(subcategory.to_string()),
        carbon_impact,
    }
}
