//! テスト用の描画面と時計
//!
//! `FakeSurface` はページ送り付きの検索結果ページを模擬する。
//! 評価されたスクリプトはデフォルトセレクタで生成したものと照合して応答する。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ListingSelectors, ScraperConfig};
use crate::error::ScraperError;
use crate::listing::scripts;
use crate::traits::{Clock, RenderSurface, SurfaceLauncher};

/// 模擬サイトの構成
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSite {
    /// ページごとの抽出スクリプトの戻り値（`Null` は結果コンテナなし）
    pub pages: Vec<Value>,
    pub page_labels: Vec<String>,
    /// 同意ダイアログのボタンラベル。`None` ならダイアログなし
    pub consent_label: Option<String>,
    pub unreachable: bool,
    /// すべてのスクリプト評価を失敗させる
    pub broken_scripts: bool,
    /// このページ以降は「次へ」が使えない
    pub next_unavailable_from: Option<u32>,
    /// このページ以降は「次へ」は見つかるがクリックに失敗する
    pub click_fails_from: Option<u32>,
    /// アクティブページ表示が更新されない
    pub indicator_frozen: bool,
    /// アクティブページ表示が更新されるまでの問い合わせ回数
    pub indicator_lag_polls: u32,
}

impl FakeSite {
    /// ページ送りなしの1ページ
    pub fn single_page(items: Vec<Value>) -> Self {
        Self {
            pages: vec![Value::Array(items)],
            ..Default::default()
        }
    }

    /// "Page 1".."Page n" のページ送り付き
    pub fn paged(pages: Vec<Value>) -> Self {
        let page_labels = (1..=pages.len()).map(|n| format!("Page {}", n)).collect();
        Self {
            pages,
            page_labels,
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct FakeState {
    current_page: u32,
    indicator_page: u32,
    lag_remaining: u32,
    consent_open: bool,
    navigations: Vec<String>,
    clicks: Vec<String>,
}

pub(crate) struct FakeSurface {
    site: FakeSite,
    selectors: ListingSelectors,
    state: Mutex<FakeState>,
    closed: Arc<AtomicUsize>,
}

impl FakeSurface {
    pub fn new(site: FakeSite) -> Self {
        let consent_open = site.consent_label.is_some();
        Self {
            site,
            selectors: ListingSelectors::default(),
            state: Mutex::new(FakeState {
                current_page: 1,
                indicator_page: 1,
                lag_remaining: 0,
                consent_open,
                navigations: Vec::new(),
                clicks: Vec::new(),
            }),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// サイトのマークアップを別のセレクタで模擬する
    pub fn with_selectors(mut self, selectors: ListingSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_close_counter(mut self, closed: Arc<AtomicUsize>) -> Self {
        self.closed = closed;
        self
    }

    pub fn current_page(&self) -> u32 {
        self.state.lock().unwrap().current_page
    }

    pub fn consent_open(&self) -> bool {
        self.state.lock().unwrap().consent_open
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    fn next_available(&self, state: &FakeState) -> bool {
        let has_more = (state.current_page as usize) < self.site.pages.len();
        let blocked = self
            .site
            .next_unavailable_from
            .is_some_and(|from| state.current_page >= from);
        has_more && !blocked
    }

    fn current_page_data(&self, state: &FakeState) -> Value {
        self.site
            .pages
            .get(state.current_page as usize - 1)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl RenderSurface for FakeSurface {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.state.lock().unwrap().navigations.push(url.to_string());
        if self.site.unreachable {
            return Err(ScraperError::Navigation(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                url
            )));
        }
        Ok(())
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), ScraperError> {
        let state = self.state.lock().unwrap();
        let present = if selector == self.selectors.next_control {
            self.next_available(&state)
        } else if selector == self.selectors.results_wrapper {
            !self.current_page_data(&state).is_null()
        } else {
            false
        };

        if present {
            Ok(())
        } else {
            Err(ScraperError::ElementNotFound(selector.to_string()))
        }
    }

    async fn click(&self, selector: &str) -> Result<(), ScraperError> {
        let mut state = self.state.lock().unwrap();
        if selector != self.selectors.next_control || !self.next_available(&state) {
            return Err(ScraperError::ElementNotFound(selector.to_string()));
        }
        if self
            .site
            .click_fails_from
            .is_some_and(|from| state.current_page >= from)
        {
            return Err(ScraperError::JavaScript(format!(
                "{} is covered by another element",
                selector
            )));
        }
        state.clicks.push(selector.to_string());
        state.current_page += 1;
        state.lag_remaining = self.site.indicator_lag_polls;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, ScraperError> {
        if self.site.broken_scripts {
            return Err(ScraperError::JavaScript("script evaluation failed".into()));
        }

        let sel = &self.selectors;
        let mut state = self.state.lock().unwrap();

        if script == scripts::dismiss_consent(sel) {
            let matches = self
                .site
                .consent_label
                .as_deref()
                .is_some_and(|label| label.contains(&sel.consent_label));
            if state.consent_open && matches {
                state.consent_open = false;
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(false))
        } else if script == scripts::pagination_labels(sel) {
            Ok(Value::from(self.site.page_labels.clone()))
        } else if script == scripts::active_page_label(sel) {
            if !self.site.indicator_frozen && state.indicator_page != state.current_page {
                if state.lag_remaining == 0 {
                    state.indicator_page = state.current_page;
                } else {
                    state.lag_remaining -= 1;
                }
            }
            Ok(Value::String(format!("Page {}", state.indicator_page)))
        } else if script == scripts::extract_records(sel) {
            Ok(self.current_page_data(&state))
        } else {
            Err(ScraperError::JavaScript("unknown script".into()))
        }
    }

    async fn close(&self) -> Result<(), ScraperError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `FakeSurface` を起動するランチャー
pub(crate) struct FakeLauncher {
    pub site: FakeSite,
    pub launches: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    /// 直近の起動で渡された headless 設定
    pub launched_headless: Arc<Mutex<Option<bool>>>,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            launches: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            launched_headless: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl SurfaceLauncher for FakeLauncher {
    async fn launch(
        &self,
        config: &ScraperConfig,
    ) -> Result<Box<dyn RenderSurface>, ScraperError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        *self.launched_headless.lock().unwrap() = Some(config.headless);
        let surface = FakeSurface::new(self.site.clone()).with_close_counter(self.closed.clone());
        Ok(Box::new(surface))
    }
}

/// sleep で仮想時間を進める時計
pub(crate) struct ManualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }

    /// すべての sleep の履歴（呼び出し順）
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// 指定した間隔（ポーリング間隔など）を除いた sleep の履歴
    pub fn sleeps_except(&self, interval: Duration) -> Vec<Duration> {
        self.sleeps()
            .into_iter()
            .filter(|d| *d != interval)
            .collect()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}
