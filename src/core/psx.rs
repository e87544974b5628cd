use crate::domain::model::{IndexSnapshot, Quote};
use crate::utils::error::{Result, TrackerError};
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

/// Client for the PSX data portal (dps.psx.com.pk).
///
/// The portal has no JSON API, so both endpoints are scraped from the HTML
/// the site serves to browsers.
pub struct PsxClient {
    client: Client,
    base_url: String,
}

impl PsxClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the constituents table for an index (e.g. KSE100).
    pub async fn fetch_index(&self, index_symbol: &str) -> Result<IndexSnapshot> {
        let url = format!("{}/indices/{}", self.base_url, index_symbol);
        tracing::debug!("Requesting index page: {}", url);

        let response = self.client.get(&url).send().await?;
        tracing::debug!("Index page status: {}", response.status());

        let body = response.error_for_status()?.text().await?;
        parse_index_document(&body)
    }

    /// Fetches the latest daily bar for one symbol from the historical page.
    ///
    /// The portal expects a form POST with month, year and symbol and
    /// renders the month's bars newest-first.
    pub async fn fetch_history(&self, symbol: &str, month: u32, year: i32) -> Result<Quote> {
        let url = format!("{}/historical", self.base_url);
        tracing::debug!("Requesting history for {} ({}/{})", symbol, month, year);

        let form = [
            ("month", month.to_string()),
            ("year", year.to_string()),
            ("symbol", symbol.to_string()),
        ];
        let response = self.client.post(&url).form(&form).send().await?;
        tracing::debug!("History page status: {}", response.status());

        let body = response.error_for_status()?.text().await?;
        parse_history_document(symbol, &body)
    }
}

pub fn parse_index_document(html: &str) -> Result<IndexSnapshot> {
    let document = Html::parse_document(html);
    let header_selector = Selector::parse("thead.tbl__head tr th").unwrap();
    let row_selector = Selector::parse("tbody.tbl__body tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let headers: Vec<String> = document.select(&header_selector).map(element_text).collect();
    if headers.is_empty() {
        return Err(TrackerError::ScrapeError {
            message: "no constituents table header on index page".to_string(),
        });
    }

    let rows: Vec<Vec<String>> = document
        .select(&row_selector)
        .map(|row| row.select(&cell_selector).map(element_text).collect())
        .collect();
    if rows.is_empty() {
        return Err(TrackerError::ScrapeError {
            message: "constituents table has no rows".to_string(),
        });
    }

    Ok(IndexSnapshot { headers, rows })
}

pub fn parse_history_document(symbol: &str, html: &str) -> Result<Quote> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    // First row is the header, second is the most recent trading day.
    let row = document
        .select(&row_selector)
        .nth(1)
        .ok_or_else(|| TrackerError::ScrapeError {
            message: format!("no trading data on historical page for {}", symbol),
        })?;

    let cells: Vec<String> = row.select(&cell_selector).map(element_text).collect();
    if cells.len() < 6 {
        return Err(TrackerError::ScrapeError {
            message: format!(
                "historical row for {} has {} cells, expected 6",
                symbol,
                cells.len()
            ),
        });
    }

    Ok(Quote {
        symbol: symbol.to_string(),
        date: cells[0].clone(),
        open: decimal_cell(symbol, "OPEN", &cells[1])?,
        high: decimal_cell(symbol, "HIGH", &cells[2])?,
        low: decimal_cell(symbol, "LOW", &cells[3])?,
        close: decimal_cell(symbol, "CLOSE", &cells[4])?,
        volume: volume_cell(symbol, &cells[5])?,
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn decimal_cell(symbol: &str, field: &str, raw: &str) -> Result<Decimal> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<Decimal>()
        .map_err(|e| TrackerError::ParseError {
            field: format!("{} ({})", field, symbol),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn volume_cell(symbol: &str, raw: &str) -> Result<u64> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<u64>()
        .map_err(|e| TrackerError::ParseError {
            field: format!("VOLUME ({})", symbol),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
