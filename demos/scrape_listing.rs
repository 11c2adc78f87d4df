use listing_scraper::{ScrapeRequest, ScraperService};
use tower::Service;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,listing_scraper=debug")),
        )
        .init();

    // 引数または環境変数から対象URLを取得
    let url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LISTING_URL").ok())
        .unwrap_or_default();

    let mut service = ScraperService::new();
    let request = ScrapeRequest::new(url).with_allow_empty(true);

    println!("=== Listing Scraper Test ===");

    match service.call(request).await {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("JSON変換エラー: {}", e),
        },
        Err(e) => {
            eprintln!("エラー ({}): {}", e.status_code(), e);
            std::process::exit(1);
        }
    }
}
