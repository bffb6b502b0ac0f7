use std::io::Write;

use chrono::{Duration, Local, NaiveDate};
use stockdash::config::EndpointConfig;
use stockdash::market::{
    commentary_request, summarize, DateRange, PriceBar, PriceHistory, DEFAULT_RANGE_DAYS,
    DEFAULT_SNAPSHOT_ROWS,
};
use stockdash::InferenceClient;

/// A deterministic, made-up price series so the example runs offline
/// (apart from the model server).
fn synthetic_history(ticker: &str, range: DateRange) -> PriceHistory {
    let mut bars = Vec::new();
    let mut date: NaiveDate = range.start();
    let mut close = 180.0;
    let mut step = 0u64;
    while date <= range.end() {
        step += 1;
        let drift = ((step % 7) as f64 - 3.0) * 0.8;
        let open = close;
        close = (close + drift).max(1.0);
        bars.push(PriceBar {
            date,
            open,
            high: open.max(close) + 1.2,
            low: open.min(close) - 1.1,
            close,
            volume: 40_000_000 + (step % 11) * 2_500_000,
        });
        date += Duration::days(1);
    }
    PriceHistory::new(ticker, bars)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt::init();

    let client = InferenceClient::builder()
        .config(EndpointConfig::from_env())
        .build()?;

    let range = DateRange::trailing(Local::now().date_naive(), DEFAULT_RANGE_DAYS);
    let history = synthetic_history("AAPL", range);

    println!("{}", summarize(&history, DEFAULT_SNAPSHOT_ROWS));
    println!("--- commentary ({}) ---", client.default_model());

    let mut printed = 0;
    let answer = client
        .ask(commentary_request(&history, DEFAULT_SNAPSHOT_ROWS), |so_far| {
            print!("{}", &so_far[printed..]);
            let _ = std::io::stdout().flush();
            printed = so_far.len();
        })
        .await;

    match answer {
        Ok(_) => println!(),
        Err(e) => eprintln!("\nCommentary failed: {}", e),
    }

    Ok(())
}
