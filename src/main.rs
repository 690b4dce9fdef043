mod config;
mod error;
mod page;
mod timezone;
mod updater;

use std::io::Write;
use std::sync::Arc;

use futures::future;
use tracing::{Instrument, debug, error, info, span};
use tracing_subscriber::EnvFilter;

use config::Config;
use page::{LATITUDE_ID, LONGITUDE_ID, MemoryPage, TIMEZONE_ID};
use timezone::{HttpTimezoneSource, TimezoneSource};
use updater::{TimezoneUpdater, UpdateOutcome};

/// The main function initializes the tracing subscriber, loads the configuration and reads
/// coordinates from stdin. Every coordinate pair is typed into the page and triggers a
/// timezone lookup; the display is printed once the lookups of a line have finished.
/// The loop ends on `exit` or end of input.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!("Using timezone service at {}", config.service_url);

    let page = Arc::new(MemoryPage::new());
    let source = HttpTimezoneSource::new(reqwest::Client::new(), &config.service_url);
    let updater = TimezoneUpdater::new(source, Arc::clone(&page))
        .with_stale_policy(config.stale_policy)
        .with_failure_policy(config.failure_policy);

    info!("Enter `latitude,longitude` (several pairs separated by `;`), `exit` to stop");

    let mut buffer = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        buffer.clear();
        if std::io::stdin().read_line(&mut buffer)? == 0 {
            break;
        }

        let line = buffer.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        run_line(&updater, &page, line)
            .instrument(span!(tracing::Level::INFO, "line", input = line))
            .await;

        println!("timezone: {}", page.text(TIMEZONE_ID));
    }

    Ok(())
}

/// Type every pair of the line into the page, triggering a lookup after each, then wait
/// for all of them. Lookups run concurrently and may resolve in any order.
async fn run_line<S: TimezoneSource>(
    updater: &TimezoneUpdater<S, MemoryPage>,
    page: &MemoryPage,
    line: &str,
) {
    let pending: Vec<_> = parse_pairs(line)
        .into_iter()
        .filter_map(|(latitude, longitude)| {
            page.set_value(LATITUDE_ID, latitude);
            page.set_value(LONGITUDE_ID, longitude);
            let pending = updater.begin();
            if pending.is_none() {
                debug!("Skipped {:?}: latitude or longitude missing", (latitude, longitude));
            }
            pending
        })
        .collect();

    let results = future::join_all(pending.into_iter().map(|p| updater.complete(p))).await;

    for result in results {
        match result {
            Ok(UpdateOutcome::Displayed(text)) => debug!("Displayed {:?}", text),
            Ok(UpdateOutcome::Discarded { token, latest }) => {
                debug!("Lookup #{} not shown, #{} is newer", token, latest)
            }
            Ok(UpdateOutcome::Skipped) => {}
            Err(e) => error!("Failed to update timezone: {}", e),
        }
    }
}

/// Split a line into coordinate pairs. Pairs are separated by `;`, the two values of a
/// pair by `,`, whitespace or both. A missing value is returned empty.
fn parse_pairs(line: &str) -> Vec<(&str, &str)> {
    line.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut values = pair
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|value| !value.is_empty());
            let latitude = values.next().unwrap_or_default();
            let longitude = values.next().unwrap_or_default();
            (latitude, longitude)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn parses_pairs() {
        assert_eq!(parse_pairs("40.7,-74.0"), vec![("40.7", "-74.0")]);
        assert_eq!(parse_pairs("40.7 -74.0"), vec![("40.7", "-74.0")]);
        assert_eq!(
            parse_pairs("40.7, -74.0; 35.6895,139.6917"),
            vec![("40.7", "-74.0"), ("35.6895", "139.6917")]
        );
        assert_eq!(parse_pairs("40.7 , -74.0"), vec![("40.7", "-74.0")]);
        assert_eq!(parse_pairs("40.7 ,-74.0"), vec![("40.7", "-74.0")]);
        assert_eq!(parse_pairs("40.7\t-74.0"), vec![("40.7", "-74.0")]);
        assert_eq!(parse_pairs("40.7"), vec![("40.7", "")]);
        assert_eq!(parse_pairs("40.7 ,"), vec![("40.7", "")]);
        assert_eq!(parse_pairs(" ; "), Vec::<(&str, &str)>::new());
    }

    #[tokio::test]
    async fn line_updates_display() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get_timezone")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "35.6895".into()),
                Matcher::UrlEncoded("lon".into(), "139.6917".into()),
            ]))
            .with_body(r#"{"timezone": "Asia/Tokyo"}"#)
            .expect(1)
            .create_async()
            .await;

        let page = Arc::new(MemoryPage::new());
        let source = HttpTimezoneSource::new(reqwest::Client::new(), &server.url());
        let updater = TimezoneUpdater::new(source, Arc::clone(&page));

        // the incomplete pair triggers nothing
        run_line(&updater, &page, "35.6895,139.6917; 12").await;

        assert_eq!(page.text(TIMEZONE_ID), "Asia/Tokyo");
        mock.assert_async().await;
    }
}
