use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::ScraperConfig;
use crate::error::ScraperError;

/// 描画済みドキュメントを操作するための能力
///
/// 1セッションが1インスタンスを専有する。ステップは常に逐次実行される。
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// URLへ遷移
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    /// セレクタに一致する要素の出現を待機
    async fn wait_for_element(&self, selector: &str, timeout: Duration)
        -> Result<(), ScraperError>;

    /// セレクタに一致する最初の要素をクリック
    async fn click(&self, selector: &str) -> Result<(), ScraperError>;

    /// スクリプトを評価して結果をJSONで返す（戻り値なしは `Null`）
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError>;

    /// リソース解放
    async fn close(&self) -> Result<(), ScraperError>;
}

/// セッションごとに `RenderSurface` を用意する
#[async_trait]
pub trait SurfaceLauncher: Send + Sync {
    async fn launch(
        &self,
        config: &ScraperConfig,
    ) -> Result<Box<dyn RenderSurface>, ScraperError>;
}

/// 待機処理用の時計
///
/// ポーリングや待機をテストで仮想時間に置き換えるために注入する。
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}
