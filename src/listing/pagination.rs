use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::{ListingSelectors, SessionTiming};
use crate::error::ScraperError;
use crate::traits::{Clock, RenderSurface};

use super::scripts;
use super::types::PageTransition;

static PAGE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Page (\d+)").expect("valid page label pattern"));

/// `"Page 3"` のようなラベルからページ番号を取り出す
pub fn parse_page_number(label: &str) -> Option<u32> {
    PAGE_LABEL
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 総ページ数の検出
pub struct PaginationDiscoverer<'a> {
    surface: &'a dyn RenderSurface,
    selectors: &'a ListingSelectors,
}

impl<'a> PaginationDiscoverer<'a> {
    pub fn new(surface: &'a dyn RenderSurface, selectors: &'a ListingSelectors) -> Self {
        Self { surface, selectors }
    }

    /// 解析できたページ番号の最大値。何もなければ 1
    pub async fn discover(&self) -> u32 {
        let script = scripts::pagination_labels(self.selectors);
        let labels = match self.surface.evaluate(&script).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Pagination query failed, assuming a single page: {}", e);
                return 1;
            }
        };

        let max_page = labels
            .as_array()
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|label| label.as_str())
                    .filter_map(|label| {
                        let page = parse_page_number(label);
                        if page.is_none() {
                            debug!("Skipping pagination label: {:?}", label);
                        }
                        page
                    })
                    .max()
                    .unwrap_or(1)
            })
            .unwrap_or(1)
            .max(1);

        info!("Found {} pages to scrape", max_page);
        max_page
    }
}

/// 次ページへの遷移と遷移確認
pub struct PageAdvancer<'a> {
    surface: &'a dyn RenderSurface,
    clock: &'a dyn Clock,
    selectors: &'a ListingSelectors,
    timing: &'a SessionTiming,
}

impl<'a> PageAdvancer<'a> {
    pub fn new(
        surface: &'a dyn RenderSurface,
        clock: &'a dyn Clock,
        selectors: &'a ListingSelectors,
        timing: &'a SessionTiming,
    ) -> Self {
        Self {
            surface,
            clock,
            selectors,
            timing,
        }
    }

    /// 「次へ」をクリックし、アクティブページが `target` になるまでポーリング
    ///
    /// 「次へ」が見つからない・クリックできない場合のみエラー。
    /// 確認のタイムアウトは `PageTransition::TimedOut` で返す。
    pub async fn advance(&self, target: u32) -> Result<PageTransition, ScraperError> {
        let next = &self.selectors.next_control;

        self.surface
            .wait_for_element(next, self.timing.next_control_timeout)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("次へボタン: {}", e)))?;
        self.surface
            .click(next)
            .await
            .map_err(|e| ScraperError::Navigation(format!("次へボタンクリック: {}", e)))?;

        let transition = self.wait_for_active_page(target).await;
        match transition {
            PageTransition::Confirmed(page) => info!("Successfully navigated to page {}", page),
            PageTransition::TimedOut => warn!(
                "Timeout waiting for page {} after {:?}",
                target, self.timing.transition_budget
            ),
        }

        // 表示更新の有無に関わらずコンテンツ描画を待つ
        self.clock.sleep(self.timing.page_settle_delay).await;

        Ok(transition)
    }

    async fn wait_for_active_page(&self, target: u32) -> PageTransition {
        let script = scripts::active_page_label(self.selectors);
        let start = self.clock.now();

        while self.clock.now().duration_since(start) < self.timing.transition_budget {
            match self.surface.evaluate(&script).await {
                Ok(value) => {
                    let active = value.as_str().and_then(parse_page_number);
                    if active == Some(target) {
                        return PageTransition::Confirmed(target);
                    }
                    debug!("Active page is {:?}, waiting for {}", active, target);
                }
                Err(e) => debug!("Active page check error: {}", e),
            }

            self.clock.sleep(self.timing.poll_interval).await;
        }

        PageTransition::TimedOut
    }
}
