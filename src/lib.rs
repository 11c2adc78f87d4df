//! リスティングスクレイパーライブラリ
//!
//! - 動的に描画される検索結果ページをページ送りしながらレコードを抽出
//! - ページ遷移は時間制限付きポーリングで確認し、途中失敗時は部分結果を返す
//!
//! # サービス使用例
//!
//! ```rust,ignore
//! use listing_scraper::{ScrapeRequest, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new("https://example.com/hotels/search")
//!         .with_headless(false);
//!
//!     let response = service.call(request).await.unwrap();
//!     println!("Records: {}", response.total_records);
//! }
//! ```
//!
//! # セッション単体の使用例
//!
//! ```rust,ignore
//! use listing_scraper::{ChromiumSurface, ListingSession, RenderSurface, ScraperConfig, TokioClock};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::from_env();
//!     let surface = ChromiumSurface::launch(&config).await.unwrap();
//!
//!     let result = ListingSession::new(&surface, &TokioClock, &config)
//!         .run("https://example.com/hotels/search")
//!         .await;
//!     surface.close().await.unwrap();
//!
//!     println!("Records: {:?}", result.map(|r| r.records.len()));
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod listing;
pub mod service;
pub mod surface;
pub mod traits;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use clock::TokioClock;
pub use config::{ListingSelectors, ScraperConfig, SessionTiming};
pub use error::ScraperError;
pub use service::{ScrapeRequest, ScrapeResponse, ScraperService};
pub use surface::{ChromiumLauncher, ChromiumSurface};
pub use traits::{Clock, RenderSurface, SurfaceLauncher};

// リスティング関連の型もリエクスポート
pub use listing::{
    ConsentOutcome, ListingResult, ListingSession, Offer, PageExtraction, PageTransition, Record,
    SessionStatus,
};
