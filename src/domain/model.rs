use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::error::{Result, TrackerError};

// Column headers on the DPS index page that the tracker reads.
pub const SYMBOL_COLUMN: &str = "SYMBOL";
pub const WEIGHT_COLUMN: &str = "IDX WTG (%)";
pub const PRICE_COLUMN: &str = "CURRENT";

/// One row of the index constituents table, cleaned and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConstituent {
    pub symbol: String,
    /// Index weighting in percent (0–100).
    pub weight_pct: Decimal,
    pub price: Decimal,
}

/// Raw scraped index table. Cells are kept as text so the audit snapshot
/// reproduces the page exactly as served.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl IndexSnapshot {
    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TrackerError::ScrapeError {
                message: format!("index table has no '{}' column", name),
            })
    }

    /// Extracts the typed constituent list from the raw table.
    ///
    /// Malformed weight or price cells are a hard error, never a silent
    /// default. Weights must lie in 0–100.
    pub fn constituents(&self) -> Result<Vec<IndexConstituent>> {
        let symbol_col = self.column(SYMBOL_COLUMN)?;
        let weight_col = self.column(WEIGHT_COLUMN)?;
        let price_col = self.column(PRICE_COLUMN)?;

        let mut constituents = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let symbol = clean_symbol(cell(row, symbol_col)?);
            let weight_pct = parse_weight(&symbol, cell(row, weight_col)?)?;
            let price = parse_price(&symbol, cell(row, price_col)?)?;
            constituents.push(IndexConstituent {
                symbol,
                weight_pct,
                price,
            });
        }
        Ok(constituents)
    }
}

fn cell<'a>(row: &'a [String], index: usize) -> Result<&'a str> {
    row.get(index)
        .map(String::as_str)
        .ok_or_else(|| TrackerError::ScrapeError {
            message: format!(
                "index row has {} cells, expected at least {}",
                row.len(),
                index + 1
            ),
        })
}

// The portal suffixes ex-dividend tickers with "XD" (e.g. "HUBCXD").
fn clean_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix("XD").unwrap_or(trimmed).to_string()
}

fn parse_weight(symbol: &str, raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let weight = parse_decimal(&format!("IDX WTG ({})", symbol), raw, stripped)?;
    if weight < Decimal::ZERO || weight > Decimal::from(100) {
        return Err(TrackerError::ParseError {
            field: format!("IDX WTG ({})", symbol),
            value: raw.to_string(),
            reason: "weight must be between 0 and 100".to_string(),
        });
    }
    Ok(weight)
}

fn parse_price(symbol: &str, raw: &str) -> Result<Decimal> {
    parse_decimal(&format!("CURRENT ({})", symbol), raw, raw)
}

// The portal renders prices with thousands separators ("1,275.99").
fn parse_decimal(field: &str, raw: &str, cleaned: &str) -> Result<Decimal> {
    let digits: String = cleaned.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<Decimal>()
        .map_err(|e| TrackerError::ParseError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// One row of the user's portfolio CSV.
///
/// The canonical headers use underscores; the space-separated variants from
/// the web form are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioHolding {
    #[serde(rename = "SYMBOL")]
    pub symbol: String,
    #[serde(rename = "SHARE_PRICE", alias = "SHARE PRICE")]
    pub share_price: Decimal,
    #[serde(rename = "SHARES")]
    pub shares: u64,
    #[serde(rename = "TOTAL_INVESTED", alias = "TOTAL INVESTED")]
    pub total_invested: Decimal,
}

/// Existing holdings keyed by symbol, at most one row per symbol.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    holdings: HashMap<String, PortfolioHolding>,
}

impl Portfolio {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(bytes);
        let mut holdings = HashMap::new();
        for record in reader.deserialize::<PortfolioHolding>() {
            let holding = record?;
            if holding.share_price < Decimal::ZERO || holding.total_invested < Decimal::ZERO {
                return Err(TrackerError::ParseError {
                    field: format!("portfolio ({})", holding.symbol),
                    value: holding.total_invested.to_string(),
                    reason: "negative amounts are not allowed".to_string(),
                });
            }
            let symbol = holding.symbol.clone();
            if holdings.insert(symbol.clone(), holding).is_some() {
                return Err(TrackerError::ParseError {
                    field: "SYMBOL".to_string(),
                    value: symbol,
                    reason: "duplicate portfolio row".to_string(),
                });
            }
        }
        Ok(Self { holdings })
    }

    /// Total amount already invested in a symbol, zero when unheld.
    pub fn invested_in(&self, symbol: &str) -> Decimal {
        self.holdings
            .get(symbol)
            .map(|h| h.total_invested)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// One row of the investment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    #[serde(rename = "SYMBOL")]
    pub symbol: String,
    /// Money to invest now, after subtracting existing holdings.
    #[serde(rename = "PRICE_TO_INVEST")]
    pub amount: Decimal,
    #[serde(rename = "CURRENT_PRICE")]
    pub price: Decimal,
    #[serde(rename = "SHARES")]
    pub shares: u64,
}

/// Latest daily bar for a symbol from the historical page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub date: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Everything extract hands to transform.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub snapshot: IndexSnapshot,
    pub constituents: Vec<IndexConstituent>,
    pub portfolio: Portfolio,
}

/// Everything transform hands to load.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub rows: Vec<PlanRow>,
    pub plan_csv: String,
    pub snapshot_csv: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(rows: Vec<Vec<&str>>) -> IndexSnapshot {
        IndexSnapshot {
            headers: vec![
                "SYMBOL".to_string(),
                "LDCP".to_string(),
                "CURRENT".to_string(),
                "CHANGE".to_string(),
                "IDX WTG (%)".to_string(),
                "VOLUME".to_string(),
            ],
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }

    #[test]
    fn extracts_typed_constituents() {
        let snap = snapshot(vec![
            vec!["HBL", "120.00", "123.45", "+3.45", "4.25%", "1,000"],
            vec!["ENGROXD", "300.10", "1,275.99", "-1.00", "6.74%", "2,000"],
        ]);

        let constituents = snap.constituents().unwrap();

        assert_eq!(constituents.len(), 2);
        assert_eq!(constituents[0].symbol, "HBL");
        assert_eq!(constituents[0].weight_pct, dec!(4.25));
        assert_eq!(constituents[0].price, dec!(123.45));
        // XD marker stripped, comma price parsed
        assert_eq!(constituents[1].symbol, "ENGRO");
        assert_eq!(constituents[1].price, dec!(1275.99));
    }

    #[test]
    fn missing_column_is_a_scrape_error() {
        let snap = IndexSnapshot {
            headers: vec!["SYMBOL".to_string(), "CURRENT".to_string()],
            rows: vec![],
        };
        let err = snap.constituents().unwrap_err();
        assert!(err.to_string().contains("IDX WTG (%)"));
    }

    #[test]
    fn malformed_weight_fails_explicitly() {
        let snap = snapshot(vec![vec!["HBL", "1", "123.45", "0", "n/a", "1"]]);
        let err = snap.constituents().unwrap_err();
        assert!(matches!(err, TrackerError::ParseError { .. }));
    }

    #[test]
    fn out_of_range_weight_is_rejected() {
        let snap = snapshot(vec![vec!["HBL", "1", "123.45", "0", "104.5%", "1"]]);
        let err = snap.constituents().unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
    }

    #[test]
    fn ragged_row_is_a_scrape_error() {
        let snap = snapshot(vec![vec!["HBL", "1"]]);
        let err = snap.constituents().unwrap_err();
        assert!(matches!(err, TrackerError::ScrapeError { .. }));
    }

    #[test]
    fn portfolio_parses_canonical_headers() {
        let csv = b"SYMBOL,SHARE_PRICE,SHARES,TOTAL_INVESTED\nHBL,120.5,10,1205\nMEBL,200,5,1000\n";
        let portfolio = Portfolio::from_csv(csv).unwrap();

        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.invested_in("HBL"), dec!(1205));
        assert_eq!(portfolio.invested_in("UBL"), Decimal::ZERO);
    }

    #[test]
    fn portfolio_accepts_web_form_headers() {
        let csv = b"SYMBOL,SHARE PRICE,SHARES,TOTAL INVESTED\nHBL,120.5,10,1205\n";
        let portfolio = Portfolio::from_csv(csv).unwrap();
        assert_eq!(portfolio.invested_in("HBL"), dec!(1205));
    }

    #[test]
    fn duplicate_portfolio_symbol_is_rejected() {
        let csv = b"SYMBOL,SHARE_PRICE,SHARES,TOTAL_INVESTED\nHBL,120.5,10,1205\nHBL,121,1,121\n";
        let err = Portfolio::from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn malformed_portfolio_amount_is_rejected() {
        let csv = b"SYMBOL,SHARE_PRICE,SHARES,TOTAL_INVESTED\nHBL,abc,10,1205\n";
        assert!(Portfolio::from_csv(csv).is_err());
    }

    #[test]
    fn negative_portfolio_amount_is_rejected() {
        let csv = b"SYMBOL,SHARE_PRICE,SHARES,TOTAL_INVESTED\nHBL,120.5,10,-1\n";
        let err = Portfolio::from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }
}
