//! Display-only payout arithmetic.
//!
//! The proportional estimate here is an approximation for the UI and is not
//! the contract's settlement arithmetic — the contract is authoritative for
//! what a winning bet actually pays.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Which side of a market a bet backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetSide {
    Yes,
    No,
}

impl BetSide {
    pub fn is_yes(self) -> bool {
        matches!(self, BetSide::Yes)
    }
}

fn round4(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Naive proportional payout estimate for a candidate bet:
/// `(yesPool + noPool + amount) / (selectedPool + amount) * amount`,
/// rounded to 4 decimals. `None` when the inputs don't parse, the amount is
/// not positive, or the selected pool (with the bet applied) is empty.
pub fn estimate_payout(
    amount: &str,
    side: BetSide,
    yes_pool: &str,
    no_pool: &str,
) -> Option<Decimal> {
    let amount = Decimal::from_str(amount.trim()).ok()?;
    if amount <= Decimal::ZERO {
        return None;
    }
    let yes = Decimal::from_str(yes_pool.trim()).ok()?;
    let no = Decimal::from_str(no_pool.trim()).ok()?;

    let total = yes + no + amount;
    let selected = if side.is_yes() { yes + amount } else { no + amount };
    if selected <= Decimal::ZERO {
        return None;
    }

    Some(round4(total / selected * amount))
}

/// Actual winnings for a bet in a settled market, under the contract's
/// pro-rata rule: `totalPool * amount / winningPool`. Losing or unparseable
/// bets pay zero; an empty winning pool pays zero.
pub fn settled_winnings(
    bet_amount: &str,
    prediction: bool,
    yes_pool: &str,
    no_pool: &str,
    result: bool,
) -> Decimal {
    if prediction != result {
        return Decimal::ZERO;
    }
    let amount = Decimal::from_str(bet_amount.trim()).unwrap_or_default();
    let yes = Decimal::from_str(yes_pool.trim()).unwrap_or_default();
    let no = Decimal::from_str(no_pool.trim()).unwrap_or_default();

    let winning = if result { yes } else { no };
    if winning <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    round4((yes + no) * amount / winning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_worked_example() {
        // (10 + 5 + 1) / (10 + 1) * 1 = 1.4545...
        let payout = estimate_payout("1", BetSide::Yes, "10", "5").unwrap();
        assert_eq!(payout, Decimal::from_str("1.4545").unwrap());
    }

    #[test]
    fn test_estimate_no_side() {
        // (10 + 5 + 1) / (5 + 1) * 1 = 2.6667 after rounding
        let payout = estimate_payout("1", BetSide::No, "10", "5").unwrap();
        assert_eq!(payout, Decimal::from_str("2.6667").unwrap());
    }

    #[test]
    fn test_estimate_empty_pools() {
        // a first bet into empty pools just gets itself back
        let payout = estimate_payout("1", BetSide::Yes, "0", "0").unwrap();
        assert_eq!(payout, Decimal::from_str("1.0000").unwrap());
    }

    #[test]
    fn test_estimate_rejects_bad_input() {
        assert_eq!(estimate_payout("0", BetSide::Yes, "10", "5"), None);
        assert_eq!(estimate_payout("-1", BetSide::Yes, "10", "5"), None);
        assert_eq!(estimate_payout("x", BetSide::Yes, "10", "5"), None);
        assert_eq!(estimate_payout("1", BetSide::Yes, "x", "5"), None);
    }

    #[test]
    fn test_settled_winnings() {
        // winner takes pro-rata share of the whole pool
        let won = settled_winnings("2", true, "10", "5", true);
        assert_eq!(won, Decimal::from_str("3.0000").unwrap());

        // loser gets nothing
        assert_eq!(
            settled_winnings("2", true, "10", "5", false),
            Decimal::ZERO
        );

        // empty winning pool pays nothing
        assert_eq!(settled_winnings("2", false, "10", "0", false), Decimal::ZERO);
    }
}
