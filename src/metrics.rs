//! Metrics extraction
//!
//! Pure transform from a canonical option-chain snapshot to one
//! [`MetricsRecord`]. Persisted field names keep the historical on-disk
//! JSON layout so existing data files stay readable.

use crate::chain::OptionChain;
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Kolkata;
use serde::{Deserialize, Serialize};

/// PCR sentiment classification.
///
/// Thresholds are checked highest-first, so a PCR of exactly 1.0 is
/// `Bullish` and exactly 1.5 is `StrongBullish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    #[serde(rename = "strong-bullish")]
    StrongBullish,
    #[serde(rename = "bullish")]
    Bullish,
    #[serde(rename = "bearish")]
    Bearish,
    #[serde(rename = "strong-bearish")]
    StrongBearish,
}

impl MarketStatus {
    pub fn from_pcr(pcr: f64) -> Self {
        if pcr >= 1.5 {
            MarketStatus::StrongBullish
        } else if pcr >= 1.0 {
            MarketStatus::Bullish
        } else if pcr >= 0.5 {
            MarketStatus::Bearish
        } else {
            MarketStatus::StrongBearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::StrongBullish => "strong-bullish",
            MarketStatus::Bullish => "bullish",
            MarketStatus::Bearish => "bearish",
            MarketStatus::StrongBearish => "strong-bearish",
        }
    }
}

/// One observation for one symbol at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// IST wall-clock time, minute resolution
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    #[serde(rename = "Total Call OI")]
    pub total_call_oi: u64,
    #[serde(rename = "Total Put OI")]
    pub total_put_oi: u64,
    /// Put-call ratio, fixed to two decimals; "0.00" when call OI is zero
    #[serde(rename = "PCR")]
    pub pcr: String,
    #[serde(rename = "ATM Strike")]
    pub atm_strike: f64,
    #[serde(rename = "ATM CE OI")]
    pub atm_call_oi: u64,
    #[serde(rename = "ATM PE OI")]
    pub atm_put_oi: u64,
    /// ATM put OI / ATM call OI, fixed to two decimals; "0.00" when undefined
    #[serde(rename = "Change PCR")]
    pub change_pcr: String,
    #[serde(rename = "Market Status")]
    pub market_status: MarketStatus,
    #[serde(rename = "Spot Price")]
    pub spot_price: f64,
}

impl MetricsRecord {
    /// Numeric PCR parsed back from the stored string
    pub fn pcr_value(&self) -> f64 {
        self.pcr.parse().unwrap_or(0.0)
    }

    /// Identity comparison used by the update decision engine.
    ///
    /// Spot price is compared after rounding to one decimal place; every
    /// other field must match exactly. The display timestamp is excluded:
    /// it is minute-resolution wall-clock text and two identical
    /// observations straddling a minute boundary must still compare equal.
    pub fn is_duplicate_of(&self, latest: &MetricsRecord) -> bool {
        fn round1(x: f64) -> f64 {
            (x * 10.0).round() / 10.0
        }

        self.total_call_oi == latest.total_call_oi
            && self.total_put_oi == latest.total_put_oi
            && self.pcr == latest.pcr
            && self.atm_strike == latest.atm_strike
            && self.atm_call_oi == latest.atm_call_oi
            && self.atm_put_oi == latest.atm_put_oi
            && self.change_pcr == latest.change_pcr
            && self.market_status == latest.market_status
            && round1(self.spot_price) == round1(latest.spot_price)
    }
}

/// Per-side OI extremes across one chain snapshot, with their strikes.
///
/// Live-snapshot data only: not persisted and not part of the record
/// identity comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OiExtremes {
    #[serde(rename = "maxCallOI")]
    pub max_call_oi: u64,
    #[serde(rename = "maxCallOIStrike")]
    pub max_call_oi_strike: f64,
    #[serde(rename = "maxPutOI")]
    pub max_put_oi: u64,
    #[serde(rename = "maxPutOIStrike")]
    pub max_put_oi_strike: f64,
    #[serde(rename = "maxCallChangeOI")]
    pub max_call_change_oi: i64,
    #[serde(rename = "maxCallChangeOIStrike")]
    pub max_call_change_oi_strike: f64,
    #[serde(rename = "maxPutChangeOI")]
    pub max_put_change_oi: i64,
    #[serde(rename = "maxPutChangeOIStrike")]
    pub max_put_change_oi_strike: f64,
}

/// Strikes carrying the heaviest OI and OI build-up on each side.
///
/// Strict greater-than comparisons from a zero baseline: the first
/// strike scanned wins ties, and a side with no positive value keeps
/// strike 0.
pub fn extremes(chain: &OptionChain) -> OiExtremes {
    let mut extremes = OiExtremes::default();

    for row in &chain.rows {
        if row.calls.open_interest > extremes.max_call_oi {
            extremes.max_call_oi = row.calls.open_interest;
            extremes.max_call_oi_strike = row.strike_price;
        }
        if row.puts.open_interest > extremes.max_put_oi {
            extremes.max_put_oi = row.puts.open_interest;
            extremes.max_put_oi_strike = row.strike_price;
        }
        if row.calls.change_in_open_interest > extremes.max_call_change_oi {
            extremes.max_call_change_oi = row.calls.change_in_open_interest;
            extremes.max_call_change_oi_strike = row.strike_price;
        }
        if row.puts.change_in_open_interest > extremes.max_put_change_oi {
            extremes.max_put_change_oi = row.puts.change_in_open_interest;
            extremes.max_put_change_oi_strike = row.strike_price;
        }
    }

    extremes
}

/// Ratio defaulting to 0 on a zero denominator or a non-finite result
fn safe_ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let ratio = numerator as f64 / denominator as f64;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Display timestamp for an observation, in exchange-local (IST) time
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&Kolkata).format("%d-%m-%Y %H:%M").to_string()
}

/// Extract a metrics record from a canonical chain snapshot.
///
/// Deterministic and side-effect free. The ATM strike is the strike
/// minimising `|strike - spot|` in a stable linear scan, so the
/// first-encountered strike wins exact ties.
pub fn extract(chain: &OptionChain, timestamp: String) -> MetricsRecord {
    let spot = chain.spot_price;

    let mut total_call_oi: u64 = 0;
    let mut total_put_oi: u64 = 0;
    let mut atm: Option<(f64, f64, u64, u64)> = None; // (distance, strike, ce_oi, pe_oi)

    for row in &chain.rows {
        total_call_oi += row.calls.open_interest;
        total_put_oi += row.puts.open_interest;

        let distance = (row.strike_price - spot).abs();
        let closer = match atm {
            None => true,
            Some((best, _, _, _)) => distance < best,
        };
        if closer {
            atm = Some((
                distance,
                row.strike_price,
                row.calls.open_interest,
                row.puts.open_interest,
            ));
        }
    }

    let (atm_strike, atm_call_oi, atm_put_oi) = match atm {
        Some((_, strike, ce, pe)) => (strike, ce, pe),
        None => (0.0, 0, 0),
    };

    let pcr = safe_ratio(total_put_oi, total_call_oi);
    let change_pcr = safe_ratio(atm_put_oi, atm_call_oi);

    MetricsRecord {
        timestamp,
        total_call_oi,
        total_put_oi,
        pcr: format!("{:.2}", pcr),
        atm_strike,
        atm_call_oi,
        atm_put_oi,
        change_pcr: format!("{:.2}", change_pcr),
        market_status: MarketStatus::from_pcr(pcr),
        spot_price: spot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::parse_payload;
    use serde_json::json;

    fn chain_from(rows: serde_json::Value) -> OptionChain {
        parse_payload(json!({"filtered": {"data": rows}})).unwrap()
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(MarketStatus::from_pcr(1.5), MarketStatus::StrongBullish);
        assert_eq!(MarketStatus::from_pcr(1.49), MarketStatus::Bullish);
        // Boundary at exactly 1.0 maps to bullish
        assert_eq!(MarketStatus::from_pcr(1.0), MarketStatus::Bullish);
        assert_eq!(MarketStatus::from_pcr(0.99), MarketStatus::Bearish);
        assert_eq!(MarketStatus::from_pcr(0.5), MarketStatus::Bearish);
        assert_eq!(MarketStatus::from_pcr(0.49), MarketStatus::StrongBearish);
    }

    #[test]
    fn test_extract_totals_and_pcr() {
        let chain = chain_from(json!([
            {"strikePrice": 90.0, "underlyingValue": 100.0,
             "CE": {"openInterest": 400}, "PE": {"openInterest": 700}},
            {"strikePrice": 100.0,
             "CE": {"openInterest": 600}, "PE": {"openInterest": 800}}
        ]));

        let record = extract(&chain, "01-01-2025 10:00".to_string());
        assert_eq!(record.total_call_oi, 1000);
        assert_eq!(record.total_put_oi, 1500);
        assert_eq!(record.pcr, "1.50");
        assert_eq!(record.market_status, MarketStatus::StrongBullish);
        assert_eq!(record.atm_strike, 100.0);
        assert_eq!(record.atm_call_oi, 600);
        assert_eq!(record.atm_put_oi, 800);
        assert_eq!(record.change_pcr, "1.33");
        assert_eq!(record.spot_price, 100.0);
    }

    #[test]
    fn test_pcr_defaults_to_zero_when_denominator_is_zero() {
        let chain = chain_from(json!([
            {"strikePrice": 100.0, "underlyingValue": 100.0,
             "PE": {"openInterest": 500}}
        ]));

        let record = extract(&chain, "01-01-2025 10:00".to_string());
        assert_eq!(record.pcr, "0.00");
        assert_eq!(record.change_pcr, "0.00");
        assert_eq!(record.market_status, MarketStatus::StrongBearish);
    }

    #[test]
    fn test_atm_tie_breaks_to_first_seen() {
        // Spot 100: strikes 95 and 105 are equidistant; the first scanned wins
        let chain = chain_from(json!([
            {"strikePrice": 95.0, "underlyingValue": 100.0,
             "CE": {"openInterest": 10}, "PE": {"openInterest": 20}},
            {"strikePrice": 105.0,
             "CE": {"openInterest": 30}, "PE": {"openInterest": 40}}
        ]));

        let first = extract(&chain, "t".to_string());
        let second = extract(&chain, "t".to_string());
        assert_eq!(first.atm_strike, 95.0);
        assert_eq!(first.atm_call_oi, 10);
        assert_eq!(first.atm_strike, second.atm_strike);
    }

    #[test]
    fn test_extremes_track_heaviest_strikes_first_seen_wins_ties() {
        let chain = chain_from(json!([
            {"strikePrice": 95.0, "underlyingValue": 100.0,
             "CE": {"openInterest": 500, "changeinOpenInterest": -40},
             "PE": {"openInterest": 300, "changeinOpenInterest": 10}},
            {"strikePrice": 100.0,
             "CE": {"openInterest": 500, "changeinOpenInterest": 60},
             "PE": {"openInterest": 800, "changeinOpenInterest": 90}}
        ]));

        let extremes = extremes(&chain);
        // Equal call OI at both strikes: the first scanned keeps the slot
        assert_eq!(extremes.max_call_oi, 500);
        assert_eq!(extremes.max_call_oi_strike, 95.0);
        assert_eq!(extremes.max_put_oi, 800);
        assert_eq!(extremes.max_put_oi_strike, 100.0);
        // A negative change never displaces the zero baseline
        assert_eq!(extremes.max_call_change_oi, 60);
        assert_eq!(extremes.max_call_change_oi_strike, 100.0);
        assert_eq!(extremes.max_put_change_oi, 90);
        assert_eq!(extremes.max_put_change_oi_strike, 100.0);
    }

    #[test]
    fn test_extremes_stay_zero_without_positive_values() {
        let chain = chain_from(json!([
            {"strikePrice": 100.0, "underlyingValue": 100.0,
             "CE": {"changeinOpenInterest": -5}}
        ]));

        let extremes = extremes(&chain);
        assert_eq!(extremes.max_call_oi, 0);
        assert_eq!(extremes.max_call_oi_strike, 0.0);
        assert_eq!(extremes.max_call_change_oi, 0);
        assert_eq!(extremes.max_put_oi, 0);
    }

    #[test]
    fn test_duplicate_comparison_rounds_spot_to_one_decimal() {
        let chain = chain_from(json!([
            {"strikePrice": 100.0, "underlyingValue": 100.0,
             "CE": {"openInterest": 100}, "PE": {"openInterest": 100}}
        ]));
        let a = extract(&chain, "01-01-2025 10:00".to_string());

        let mut b = a.clone();
        b.timestamp = "01-01-2025 10:01".to_string();
        b.spot_price = 100.04; // rounds to the same 1-decimal value
        assert!(b.is_duplicate_of(&a));

        b.spot_price = 100.06;
        assert!(!b.is_duplicate_of(&a));
    }

    #[test]
    fn test_persisted_field_names_keep_historical_layout() {
        let chain = chain_from(json!([
            {"strikePrice": 100.0, "underlyingValue": 100.0,
             "CE": {"openInterest": 1}, "PE": {"openInterest": 2}}
        ]));
        let record = extract(&chain, "01-01-2025 10:00".to_string());
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("timeStamp").is_some());
        assert!(value.get("Total Call OI").is_some());
        assert!(value.get("PCR").is_some());
        assert!(value.get("Market Status").is_some());
        assert_eq!(value["Market Status"], "strong-bullish");
    }
}
