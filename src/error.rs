use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("JSON変換エラー: {0}")]
    Json(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("不正なリクエスト: {0}")]
    InvalidRequest(String),

    #[error("レコードなし: {0}")]
    NoRecords(String),
}

impl ScraperError {
    /// HTTP相当のステータスコード
    ///
    /// リクエスト境界で使う。コア自体はステータスを意識しない。
    pub fn status_code(&self) -> u16 {
        match self {
            ScraperError::InvalidRequest(_) => 400,
            ScraperError::NoRecords(_) => 404,
            _ => 500,
        }
    }

    /// ページ遷移を続行できない種類のエラーか
    pub fn is_navigation_fault(&self) -> bool {
        matches!(
            self,
            ScraperError::Navigation(_)
                | ScraperError::ElementNotFound(_)
                | ScraperError::Timeout(_)
        )
    }
}

impl From<serde_json::Error> for ScraperError {
    fn from(e: serde_json::Error) -> Self {
        ScraperError::Json(e.to_string())
    }
}
