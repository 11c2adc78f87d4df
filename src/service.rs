use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::Service;
use tracing::{info, warn};

use crate::clock::TokioClock;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::listing::{ListingResult, ListingSession, Record, SessionStatus};
use crate::surface::ChromiumLauncher;
use crate::traits::{Clock, SurfaceLauncher};

/// スクレイピングリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    /// 設定値を上書きする場合のみ指定
    #[serde(default)]
    pub headless: Option<bool>,
    /// `true` ならレコード0件も成功として返す
    #[serde(default)]
    pub allow_empty: bool,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headless: None,
            allow_empty: false,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// 空のURLはコアを呼ぶ前に弾く
    fn validated_url(&self) -> Result<&str, ScraperError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ScraperError::InvalidRequest("url パラメータがありません".into()));
        }
        Ok(url)
    }
}

/// スクレイピング結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub records: Vec<Record>,
    pub total_records: usize,
    pub total_pages: u32,
    pub pages_scraped: u32,
    pub status: SessionStatus,
    pub scraped_at: DateTime<Utc>,
}

impl ScrapeResponse {
    fn from_result(result: ListingResult, scraped_at: DateTime<Utc>) -> Self {
        Self {
            total_records: result.records.len(),
            records: result.records,
            total_pages: result.total_pages,
            pages_scraped: result.pages_scraped,
            status: result.status,
            scraped_at,
        }
    }
}

/// tower::Serviceを実装したスクレイパーサービス
///
/// 呼び出しごとに描画面を1つ起動し、終了時に必ず閉じる。
pub struct ScraperService<L = ChromiumLauncher> {
    config: ScraperConfig,
    launcher: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L> Clone for ScraperService<L> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            launcher: Arc::clone(&self.launcher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl ScraperService<ChromiumLauncher> {
    pub fn new() -> Self {
        Self::with_config(ScraperConfig::from_env())
    }

    pub fn with_config(config: ScraperConfig) -> Self {
        Self::with_launcher(config, ChromiumLauncher)
    }
}

impl Default for ScraperService<ChromiumLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: SurfaceLauncher + 'static> ScraperService<L> {
    pub fn with_launcher(config: ScraperConfig, launcher: L) -> Self {
        Self {
            config,
            launcher: Arc::new(launcher),
            clock: Arc::new(TokioClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }
}

impl<L: SurfaceLauncher + 'static> Service<ScrapeRequest> for ScraperService<L> {
    type Response = ScrapeResponse;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("スクレイピングリクエスト受信: url={}", req.url);

        let mut config = self.config.clone();
        let launcher = Arc::clone(&self.launcher);
        let clock = Arc::clone(&self.clock);

        Box::pin(async move {
            let url = req.validated_url()?.to_string();
            if let Some(headless) = req.headless {
                config.headless = headless;
            }

            let surface = launcher.launch(&config).await?;
            let result = ListingSession::new(surface.as_ref(), clock.as_ref(), &config)
                .run(&url)
                .await;

            if let Err(e) = surface.close().await {
                warn!("描画面の終了に失敗: {}", e);
            }

            let result = result?;
            if result.records.is_empty() && !req.allow_empty {
                return Err(ScraperError::NoRecords(format!(
                    "{} からレコードを取得できませんでした",
                    url
                )));
            }

            let response = ScrapeResponse::from_result(result, Utc::now());
            info!(
                "スクレイピング完了: records={}, pages={}/{}",
                response.total_records, response.pages_scraped, response.total_pages
            );

            Ok(response)
        })
    }
}
