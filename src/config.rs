use std::path::PathBuf;
use std::time::Duration;

/// セッション内の待機時間設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTiming {
    /// ナビゲーション直後の待機
    pub post_navigation_delay: Duration,
    /// 同意ダイアログ処理後、初期コンテンツ描画までの待機
    pub consent_settle_delay: Duration,
    /// 結果コンテナの出現待ちタイムアウト
    pub results_wait_timeout: Duration,
    /// 「次へ」ボタンの出現待ちタイムアウト
    pub next_control_timeout: Duration,
    /// アクティブページ確認のポーリング間隔
    pub poll_interval: Duration,
    /// ページ遷移確認の最大待機時間
    pub transition_budget: Duration,
    /// ページ遷移後、抽出前の待機
    pub page_settle_delay: Duration,
    /// ページ間の待機（最終ページの後には入れない）
    pub inter_page_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            post_navigation_delay: Duration::from_secs(3),
            consent_settle_delay: Duration::from_secs(5),
            results_wait_timeout: Duration::from_secs(10),
            next_control_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            transition_budget: Duration::from_secs(15),
            page_settle_delay: Duration::from_secs(3),
            inter_page_delay: Duration::from_secs(2),
        }
    }
}

/// 対象ページのCSSセレクタ
///
/// デフォルト値は現行の検索結果ページのマークアップに合わせている。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    pub consent_dialog: String,
    pub consent_button: String,
    /// 閉じるボタンのラベル（部分一致）
    pub consent_label: String,
    pub results_wrapper: String,
    /// 結果コンテナ内の各アイテム
    pub item: String,
    pub name: String,
    /// アイテム内の各オファー（リンク要素）
    pub offer: String,
    pub price: String,
    pub logo: String,
    pub pagination_control: String,
    pub next_control: String,
    pub active_control: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            consent_dialog: r#"[role="dialog"]"#.to_string(),
            consent_button: ".RxNS-button-content".to_string(),
            consent_label: "Got it".to_string(),
            results_wrapper: "section#resultWrapper".to_string(),
            item: ".S0Ps .S0Ps-middleSection".to_string(),
            name: ".c9Hnq .c9Hnq-hotel-name".to_string(),
            offer: ".qSC7-pres-vertical >div >a".to_string(),
            price: ".hzpu-vertical-price".to_string(),
            logo: "img.afsH-provider-logo".to_string(),
            pagination_control: r#".Joiu-buttons button[aria-label^="Page "]"#.to_string(),
            next_control: r#"button[aria-label="Next page"]:not([disabled])"#.to_string(),
            active_control: r#"button[id="active"]"#.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
    /// CDPリクエストタイムアウト
    pub request_timeout: Duration,
    pub timing: SessionTiming,
    pub selectors: ListingSelectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            navigation_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(60),
            timing: SessionTiming::default(),
            selectors: ListingSelectors::default(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数から設定を読み込む
    ///
    /// - `CHROME_PATH` / `CHROMIUM_PATH`: ブラウザ実行ファイル
    /// - `SCRAPER_HEADLESS`: `0` または `false` で表示モード
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        if let Ok(value) = std::env::var("SCRAPER_HEADLESS") {
            config.headless = parse_flag(&value).unwrap_or(true);
        }

        config
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_selectors(mut self, selectors: ListingSelectors) -> Self {
        self.selectors = selectors;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
