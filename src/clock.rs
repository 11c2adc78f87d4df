use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::traits::Clock;

/// tokio のタイマーを使う実時間クロック
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
