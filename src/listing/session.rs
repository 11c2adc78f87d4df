//! ページ送りセッション
//!
//! 遷移 → 同意ダイアログ → ページ数検出 → 各ページの抽出、を逐次実行する。

use tracing::{error, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{Clock, RenderSurface};

use super::consent::ConsentDismisser;
use super::extractor::RecordExtractor;
use super::pagination::{PageAdvancer, PaginationDiscoverer};
use super::types::{ListingResult, PageExtraction, PageTransition, Record, SessionStatus};

/// 1回の実行中の状態
struct Session<'u> {
    target_url: &'u str,
    current_page: u32,
    total_pages: Option<u32>,
    records: Vec<Record>,
    pages_scraped: u32,
    pages_without_results: Vec<u32>,
    status: SessionStatus,
}

impl<'u> Session<'u> {
    fn new(target_url: &'u str) -> Self {
        Self {
            target_url,
            current_page: 1,
            total_pages: None,
            records: Vec::new(),
            pages_scraped: 0,
            pages_without_results: Vec::new(),
            status: SessionStatus::Complete,
        }
    }

    fn append_page(&mut self, extraction: PageExtraction) -> usize {
        if extraction == PageExtraction::WrapperMissing {
            self.pages_without_results.push(self.current_page);
        }
        let records = extraction.into_records();
        let count = records.len();
        self.records.extend(records);
        self.pages_scraped += 1;
        count
    }

    fn finish(self) -> ListingResult {
        ListingResult {
            records: self.records,
            total_pages: self.total_pages.unwrap_or(1),
            pages_scraped: self.pages_scraped,
            pages_without_results: self.pages_without_results,
            status: self.status,
        }
    }
}

/// セッションのオーケストレーター
///
/// `RenderSurface` はこのセッションが専有する。
pub struct ListingSession<'a> {
    surface: &'a dyn RenderSurface,
    clock: &'a dyn Clock,
    config: &'a ScraperConfig,
}

impl<'a> ListingSession<'a> {
    pub fn new(
        surface: &'a dyn RenderSurface,
        clock: &'a dyn Clock,
        config: &'a ScraperConfig,
    ) -> Self {
        Self {
            surface,
            clock,
            config,
        }
    }

    /// セッションを実行
    ///
    /// 初回遷移の失敗だけがエラーになる。途中のページ送り失敗は
    /// `SessionStatus::Partial` としてそれまでのレコードを返す。
    pub async fn run(&self, target_url: &str) -> Result<ListingResult, ScraperError> {
        let timing = &self.config.timing;
        let selectors = &self.config.selectors;
        let mut session = Session::new(target_url);

        info!("Navigating to {}", session.target_url);
        self.surface.navigate(session.target_url).await.map_err(|e| match e {
            ScraperError::Navigation(_) => e,
            other => ScraperError::Navigation(other.to_string()),
        })?;
        info!("Page loaded");

        self.clock.sleep(timing.post_navigation_delay).await;

        ConsentDismisser::new(self.surface, selectors).attempt().await;

        // クライアント描画の一覧には完了通知がないため固定時間待つ
        self.clock.sleep(timing.consent_settle_delay).await;

        if let Err(e) = self
            .surface
            .wait_for_element(&selectors.results_wrapper, timing.results_wait_timeout)
            .await
        {
            warn!("Results wrapper not found, continuing anyway: {}", e);
        }

        let total_pages = PaginationDiscoverer::new(self.surface, selectors)
            .discover()
            .await;
        session.total_pages = Some(total_pages);

        let advancer = PageAdvancer::new(self.surface, self.clock, selectors, timing);
        let extractor = RecordExtractor::new(self.surface, selectors);

        for page in 1..=total_pages {
            info!("Scraping page {} of {}", page, total_pages);

            if page > 1 {
                match advancer.advance(page).await {
                    Ok(PageTransition::Confirmed(_)) => {}
                    Ok(PageTransition::TimedOut) => {
                        warn!("Page {} not confirmed, extracting current page anyway", page);
                    }
                    Err(e) => {
                        if e.is_navigation_fault() {
                            warn!("Failed to navigate to page {}: {}", page, e);
                        } else {
                            error!("Unexpected error navigating to page {}: {}", page, e);
                        }
                        session.status = SessionStatus::Partial {
                            stopped_at_page: page,
                            reason: e.to_string(),
                        };
                        break;
                    }
                }
                session.current_page = page;
            }

            let extraction = extractor.extract_current_page().await;
            let count = session.append_page(extraction);
            info!("Scraped {} records from page {}", count, page);

            if page < total_pages {
                self.clock.sleep(timing.inter_page_delay).await;
            }
        }

        let result = session.finish();
        info!(
            "Total records scraped: {} ({} of {} pages)",
            result.records.len(),
            result.pages_scraped,
            result.total_pages
        );
        Ok(result)
    }
}
