use crate::models::{FeeMetric, FeeTotals};

/// Sum every fee column across `records` with arbitrary-precision addition
pub fn aggregate(records: &[FeeMetric]) -> FeeTotals {
    records.iter().fold(FeeTotals::default(), |mut totals, record| {
        totals.partner_base_fee += &record.partner_base_fee;
        totals.partner_quote_fee += &record.partner_quote_fee;
        totals.creator_base_fee += &record.creator_base_fee;
        totals.creator_quote_fee += &record.creator_quote_fee;
        totals.total_trading_base_fee += &record.total_trading_base_fee;
        totals.total_trading_quote_fee += &record.total_trading_quote_fee;
        totals
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    fn metric(values: [&str; 6]) -> FeeMetric {
        let a = |s: &str| Amount::from_str(s).unwrap();
        FeeMetric {
            pool_address: Pubkey::new_unique(),
            partner_base_fee: a(values[0]),
            partner_quote_fee: a(values[1]),
            creator_base_fee: a(values[2]),
            creator_quote_fee: a(values[3]),
            total_trading_base_fee: a(values[4]),
            total_trading_quote_fee: a(values[5]),
        }
    }

    #[test]
    fn empty_input_sums_to_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals, FeeTotals::default());
        assert!(totals.partner_quote_fee.is_zero());
    }

    #[test]
    fn sums_past_the_f64_integer_limit() {
        let records = vec![
            metric(["9007199254740993", "0", "0", "0", "0", "0"]),
            metric(["1", "0", "0", "0", "0", "0"]),
        ];
        let totals = aggregate(&records);
        assert_eq!(totals.partner_base_fee.to_string(), "9007199254740994");
    }

    #[test]
    fn order_does_not_matter() {
        let a = metric(["1", "20", "300", "4000", "50000", "600000"]);
        let b = metric(["7", "8", "9", "10", "11", "12"]);
        let c = metric(["18446744073709551616", "5", "0", "1", "2", "3"]);

        let forward = aggregate(&[a.clone(), b.clone(), c.clone()]);
        let backward = aggregate(&[c.clone(), b.clone(), a.clone()]);
        let shuffled = aggregate(&[b, c, a]);
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
        assert_eq!(forward.partner_base_fee.to_string(), "18446744073709551624");
        assert_eq!(forward.total_trading_quote_fee.to_string(), "600015");
    }
}
