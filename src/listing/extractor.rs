use tracing::{debug, warn};

use crate::config::ListingSelectors;
use crate::traits::RenderSurface;

use super::scripts;
use super::types::{PageExtraction, Record};

/// 現在ページのレコード抽出
pub struct RecordExtractor<'a> {
    surface: &'a dyn RenderSurface,
    selectors: &'a ListingSelectors,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(surface: &'a dyn RenderSurface, selectors: &'a ListingSelectors) -> Self {
        Self { surface, selectors }
    }

    /// 1回のスクリプト評価で現在ページのスナップショットを取る
    pub async fn extract_current_page(&self) -> PageExtraction {
        let script = scripts::extract_records(self.selectors);

        let value = match self.surface.evaluate(&script).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Record extraction script failed: {}", e);
                return PageExtraction::Failed(e.to_string());
            }
        };

        if value.is_null() {
            debug!(
                "Results wrapper '{}' not present on this page",
                self.selectors.results_wrapper
            );
            return PageExtraction::WrapperMissing;
        }

        match serde_json::from_value::<Vec<Record>>(value) {
            Ok(records) => PageExtraction::Extracted(records),
            Err(e) => {
                warn!("Unexpected record shape from page: {}", e);
                PageExtraction::Failed(e.to_string())
            }
        }
    }
}
