use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{RenderSurface, SurfaceLauncher};

/// 要素出現待ちのポーリング間隔
const ELEMENT_POLL_INTERVAL_MS: u64 = 250;

/// chromiumoxide の1タブを描画面として扱う
pub struct ChromiumSurface {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
    /// 起動ごとのプロファイル。close で削除する
    user_data_dir: PathBuf,
}

/// 使い終わったブラウザプロファイルを削除
async fn remove_profile_dir(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => debug!("Removed browser profile {:?}", path),
        Err(e) => warn!("Failed to remove browser profile {:?}: {}", path, e),
    }
}

/// 読み込み全体（goto と完了待ち）を1つのタイムアウトで打ち切る
async fn load_within<F>(limit: Duration, url: &str, load: F) -> Result<(), ScraperError>
where
    F: std::future::Future<Output = Result<(), ScraperError>>,
{
    match tokio::time::timeout(limit, load).await {
        Ok(result) => result,
        Err(_) => Err(ScraperError::Timeout(format!(
            "{} の読み込みが{:?}以内に完了しませんでした",
            url, limit
        ))),
    }
}

impl ChromiumSurface {
    /// ブラウザを起動して空のページを開く
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        info!("Initializing browser for listing scraper...");

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir: PathBuf =
            std::env::temp_dir().join(format!("listing-scraper-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800)
            .request_timeout(config.request_timeout);

        if let Some(chrome_path) = &config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {:?}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                if let Err(close_err) = browser.close().await {
                    debug!("Failed to close browser: {}", close_err);
                }
                let _ = browser.wait().await;
                handler_task.abort();
                remove_profile_dir(&user_data_dir).await;
                return Err(ScraperError::BrowserInit(e.to_string()));
            }
        };

        info!("Browser initialized successfully");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler_task,
            navigation_timeout: config.navigation_timeout,
            user_data_dir,
        })
    }
}

#[async_trait]
impl RenderSurface for ChromiumSurface {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let start = Instant::now();

        let load = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| ScraperError::Navigation(e.to_string()))?;
            if let Err(e) = self.page.wait_for_navigation().await {
                debug!("wait_for_navigation error: {}", e);
            }
            Ok::<(), ScraperError>(())
        };

        load_within(self.navigation_timeout, url, load).await?;

        debug!("Navigated to {} in {:?}", url, start.elapsed());
        Ok(())
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScraperError> {
        let start = Instant::now();

        loop {
            match self.page.find_element(selector).await {
                Ok(_) => return Ok(()),
                Err(e) => debug!("Element {} not ready: {}", selector, e),
            }

            if start.elapsed() >= timeout {
                return Err(ScraperError::ElementNotFound(format!(
                    "{} ({:?}待機)",
                    selector, timeout
                )));
            }

            sleep(Duration::from_millis(ELEMENT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<(), ScraperError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("{} クリック: {}", selector, e)))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(&self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close page: {}", e);
        }

        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed to wait for browser exit: {}", e);
            }
        }

        self.handler_task.abort();
        remove_profile_dir(&self.user_data_dir).await;
        info!("Browser closed");
        Ok(())
    }
}

/// セッションごとに新しいブラウザを起動する
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

#[async_trait]
impl SurfaceLauncher for ChromiumLauncher {
    async fn launch(
        &self,
        config: &ScraperConfig,
    ) -> Result<Box<dyn RenderSurface>, ScraperError> {
        let surface = ChromiumSurface::launch(config).await?;
        Ok(Box::new(surface))
    }
}
