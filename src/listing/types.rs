//! リスティング関連の型定義

use serde::{Deserialize, Serialize};

/// 1件のオファー（掲載元へのリンク）
///
/// 各フィールドは独立して省略可能。対応する要素がなければ `None` のまま。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// 抽出した1エンティティ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub name: String,
    /// DOM順のオファー
    #[serde(default, rename = "providers")]
    pub offers: Vec<Offer>,
}

/// ページ遷移の確認結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTransition {
    Confirmed(u32),
    /// 予算内にアクティブページ表示が更新されなかった（続行可能）
    TimedOut,
}

/// 同意ダイアログ処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    Dismissed,
    NotFound,
    Failed(String),
}

impl ConsentOutcome {
    pub fn dismissed(&self) -> bool {
        matches!(self, ConsentOutcome::Dismissed)
    }
}

/// 1ページ分の抽出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExtraction {
    Extracted(Vec<Record>),
    /// 結果コンテナ自体が存在しない（空として扱う）
    WrapperMissing,
    /// 抽出スクリプトの失敗（空として扱う）
    Failed(String),
}

impl PageExtraction {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            PageExtraction::Extracted(records) => records,
            PageExtraction::WrapperMissing | PageExtraction::Failed(_) => Vec::new(),
        }
    }
}

/// セッションの終了状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// 発見した全ページを処理した
    Complete,
    /// 途中のページ遷移に失敗し、それまでの結果を返した
    Partial { stopped_at_page: u32, reason: String },
}

/// セッションの実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResult {
    pub records: Vec<Record>,
    pub total_pages: u32,
    pub pages_scraped: u32,
    /// 結果コンテナが見つからなかったページ番号
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages_without_results: Vec<u32>,
    pub status: SessionStatus,
}

impl ListingResult {
    pub fn is_partial(&self) -> bool {
        matches!(self.status, SessionStatus::Partial { .. })
    }
}
