use crate::domain::model::{IndexConstituent, PlanRow, Portfolio};
use crate::utils::error::{Result, TrackerError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Computes the per-symbol investment plan.
///
/// Each constituent's target allocation is its index weighting applied to
/// the total money. Whatever is already invested in the symbol counts
/// against the target, and shares are whole units at the current price.
/// Cheap stocks that are not yet held get a one-share minimum when the
/// allocation alone would buy nothing.
pub fn compute_plan(
    constituents: &[IndexConstituent],
    portfolio: &Portfolio,
    money_to_invest: Decimal,
    threshold: Decimal,
) -> Result<Vec<PlanRow>> {
    let mut rows = Vec::with_capacity(constituents.len());

    for constituent in constituents {
        if constituent.price <= Decimal::ZERO {
            return Err(TrackerError::ProcessingError {
                message: format!(
                    "non-positive price for {}: {}",
                    constituent.symbol, constituent.price
                ),
            });
        }

        let target = money_to_invest * constituent.weight_pct / Decimal::from(100);
        let existing = portfolio.invested_in(&constituent.symbol);
        let amount = (target - existing).max(Decimal::ZERO).round_dp(2);

        let mut shares = (amount / constituent.price)
            .floor()
            .to_u64()
            .ok_or_else(|| TrackerError::ProcessingError {
                message: format!("share count overflow for {}", constituent.symbol),
            })?;

        // Minimum position for cheap, currently unheld stocks.
        if existing == Decimal::ZERO && shares == 0 && constituent.price <= threshold {
            shares = 1;
        }

        rows.push(PlanRow {
            symbol: constituent.symbol.clone(),
            amount,
            price: constituent.price,
            shares,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn constituent(symbol: &str, weight_pct: Decimal, price: Decimal) -> IndexConstituent {
        IndexConstituent {
            symbol: symbol.to_string(),
            weight_pct,
            price,
        }
    }

    fn portfolio_with(symbol: &str, total_invested: Decimal) -> Portfolio {
        let csv = format!(
            "SYMBOL,SHARE_PRICE,SHARES,TOTAL_INVESTED\n{},1,1,{}\n",
            symbol, total_invested
        );
        Portfolio::from_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn allocates_weight_share_of_the_money() {
        // 5% of 100000 targets 5000, which buys one share at 4800
        let constituents = vec![constituent("HBL", dec!(5), dec!(4800))];

        let plan = compute_plan(
            &constituents,
            &Portfolio::empty(),
            dec!(100000),
            Decimal::ZERO,
        )
        .unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].amount, dec!(5000));
        assert_eq!(plan[0].shares, 1);
        assert_eq!(plan[0].price, dec!(4800));
    }

    #[test]
    fn full_weights_spend_the_full_amount() {
        let constituents = vec![
            constituent("A", dec!(50), dec!(10)),
            constituent("B", dec!(30), dec!(10)),
            constituent("C", dec!(20), dec!(10)),
        ];

        let plan = compute_plan(
            &constituents,
            &Portfolio::empty(),
            dec!(10000),
            Decimal::ZERO,
        )
        .unwrap();

        let total: Decimal = plan.iter().map(|r| r.amount).sum();
        assert_eq!(total, dec!(10000));
    }

    #[test]
    fn fully_invested_symbol_gets_nothing() {
        let constituents = vec![constituent("HBL", dec!(5), dec!(100))];
        let portfolio = portfolio_with("HBL", dec!(6000));

        let plan = compute_plan(&constituents, &portfolio, dec!(100000), dec!(450)).unwrap();

        // existing 6000 exceeds the 5000 target; threshold must not fire
        assert_eq!(plan[0].amount, Decimal::ZERO);
        assert_eq!(plan[0].shares, 0);
    }

    #[test]
    fn partial_holding_reduces_the_allocation() {
        let constituents = vec![constituent("HBL", dec!(5), dec!(100))];
        let portfolio = portfolio_with("HBL", dec!(1200));

        let plan = compute_plan(&constituents, &portfolio, dec!(100000), Decimal::ZERO).unwrap();

        assert_eq!(plan[0].amount, dec!(3800));
        assert_eq!(plan[0].shares, 38);
    }

    #[test]
    fn threshold_forces_one_share_for_cheap_unheld_stock() {
        // target 10 buys nothing at 300, but 300 is within the threshold
        let constituents = vec![constituent("PAEL", dec!(1), dec!(300))];

        let plan = compute_plan(&constituents, &Portfolio::empty(), dec!(1000), dec!(300)).unwrap();

        assert_eq!(plan[0].shares, 1);
        assert_eq!(plan[0].amount, dec!(10));
    }

    #[test]
    fn threshold_ignores_stocks_above_the_cutoff() {
        let constituents = vec![constituent("PAEL", dec!(1), dec!(301))];

        let plan = compute_plan(&constituents, &Portfolio::empty(), dec!(1000), dec!(300)).unwrap();

        assert_eq!(plan[0].shares, 0);
    }

    #[test]
    fn threshold_ignores_already_held_stocks() {
        let constituents = vec![constituent("PAEL", dec!(1), dec!(300))];
        let portfolio = portfolio_with("PAEL", dec!(5));

        let plan = compute_plan(&constituents, &portfolio, dec!(1000), dec!(300)).unwrap();

        // allocation drops to 5, which still buys nothing, and the
        // minimum-position rule only applies to unheld symbols
        assert_eq!(plan[0].amount, dec!(5));
        assert_eq!(plan[0].shares, 0);
    }

    #[test]
    fn amounts_are_rounded_to_cents() {
        let constituents = vec![constituent("HBL", dec!(4.567), dec!(100))];

        let plan = compute_plan(&constituents, &Portfolio::empty(), dec!(99999), Decimal::ZERO)
            .unwrap();

        assert_eq!(plan[0].amount, dec!(4566.95));
        assert_eq!(plan[0].shares, 45);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let constituents = vec![constituent("HBL", dec!(5), Decimal::ZERO)];

        let err = compute_plan(
            &constituents,
            &Portfolio::empty(),
            dec!(100000),
            Decimal::ZERO,
        )
        .unwrap_err();

        assert!(matches!(err, TrackerError::ProcessingError { .. }));
    }
}
