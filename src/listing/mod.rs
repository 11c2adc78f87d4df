//! ページ送り型リスティングのスクレイピング
//!
//! 描画済みの検索結果ページを1ページずつ進めながらレコードを抽出する

mod consent;
mod extractor;
mod pagination;
pub(crate) mod scripts;
mod session;
mod types;

pub use consent::ConsentDismisser;
pub use extractor::RecordExtractor;
pub use pagination::{parse_page_number, PageAdvancer, PaginationDiscoverer};
pub use session::ListingSession;
pub use types::{
    ConsentOutcome, ListingResult, Offer, PageExtraction, PageTransition, Record, SessionStatus,
};
