//! Upstream option-chain payload schema
//!
//! The upstream JSON is loosely shaped: per-strike rows may carry a `CE`
//! leg, a `PE` leg, or both, and most numeric fields can be absent. This
//! module validates the payload at the boundary and converts it into one
//! canonical shape, with the default-to-zero policy for missing leg
//! fields applied in exactly one place (`ChainLeg::from_raw`).

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Raw upstream payload, as served by the option-chain endpoints
#[derive(Debug, Deserialize)]
struct RawPayload {
    filtered: Option<RawFiltered>,
}

#[derive(Debug, Deserialize)]
struct RawFiltered {
    data: Option<Vec<RawStrikeRow>>,
}

#[derive(Debug, Deserialize)]
struct RawStrikeRow {
    #[serde(rename = "strikePrice")]
    strike_price: f64,
    #[serde(rename = "expiryDate")]
    expiry_date: Option<String>,
    #[serde(rename = "underlyingValue")]
    underlying_value: Option<f64>,
    #[serde(rename = "CE")]
    ce: Option<RawLeg>,
    #[serde(rename = "PE")]
    pe: Option<RawLeg>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    #[serde(rename = "openInterest", default)]
    open_interest: i64,
    #[serde(rename = "changeinOpenInterest", default)]
    change_in_open_interest: i64,
    #[serde(rename = "totalTradedVolume", default)]
    total_traded_volume: i64,
    #[serde(rename = "impliedVolatility", default)]
    implied_volatility: f64,
    #[serde(rename = "lastPrice", default)]
    last_price: f64,
    #[serde(rename = "pChange", default)]
    percent_change: f64,
    #[serde(rename = "bidQty", default)]
    bid_qty: i64,
    #[serde(rename = "bidprice", default)]
    bid_price: f64,
    #[serde(rename = "askPrice", default)]
    ask_price: f64,
    #[serde(rename = "askQty", default)]
    ask_qty: i64,
    #[serde(rename = "underlyingValue")]
    underlying_value: Option<f64>,
}

/// One side (calls or puts) of a canonical chain row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainLeg {
    #[serde(rename = "openInterest")]
    pub open_interest: u64,
    #[serde(rename = "changeinOpenInterest")]
    pub change_in_open_interest: i64,
    #[serde(rename = "totalTradedVolume")]
    pub total_traded_volume: i64,
    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: f64,
    #[serde(rename = "lastPrice")]
    pub last_price: f64,
    #[serde(rename = "change")]
    pub percent_change: f64,
    #[serde(rename = "bidQty")]
    pub bid_qty: i64,
    #[serde(rename = "bidPrice")]
    pub bid_price: f64,
    #[serde(rename = "askPrice")]
    pub ask_price: f64,
    #[serde(rename = "askQty")]
    pub ask_qty: i64,
}

impl ChainLeg {
    /// Absent leg: every field is zero
    fn absent() -> Self {
        Self {
            open_interest: 0,
            change_in_open_interest: 0,
            total_traded_volume: 0,
            implied_volatility: 0.0,
            last_price: 0.0,
            percent_change: 0.0,
            bid_qty: 0,
            bid_price: 0.0,
            ask_price: 0.0,
            ask_qty: 0,
        }
    }

    fn from_raw(raw: Option<&RawLeg>) -> Self {
        match raw {
            None => Self::absent(),
            Some(leg) => Self {
                // Upstream occasionally reports negative OI; clamp to the
                // non-negative domain the rest of the system assumes.
                open_interest: leg.open_interest.max(0) as u64,
                change_in_open_interest: leg.change_in_open_interest,
                total_traded_volume: leg.total_traded_volume,
                implied_volatility: leg.implied_volatility,
                last_price: leg.last_price,
                percent_change: leg.percent_change,
                bid_qty: leg.bid_qty,
                bid_price: leg.bid_price,
                ask_price: leg.ask_price,
                ask_qty: leg.ask_qty,
            },
        }
    }
}

/// Canonical per-strike row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainRow {
    #[serde(rename = "strikePrice")]
    pub strike_price: f64,
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,
    pub calls: ChainLeg,
    pub puts: ChainLeg,
}

/// Canonical option-chain snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChain {
    pub spot_price: f64,
    pub expiry_date: String,
    pub rows: Vec<ChainRow>,
}

/// Validate and canonicalise an upstream payload.
///
/// Fails with [`AppError::InvalidUpstreamFormat`] when the filtered-data
/// block is absent or malformed. Rows with neither a call nor a put leg
/// are dropped.
pub fn parse_payload(payload: serde_json::Value) -> Result<OptionChain> {
    let raw: RawPayload = serde_json::from_value(payload)
        .map_err(|e| AppError::InvalidUpstreamFormat(e.to_string()))?;

    let data = raw
        .filtered
        .and_then(|f| f.data)
        .ok_or_else(|| AppError::InvalidUpstreamFormat("missing filtered data".to_string()))?;

    let spot_price = data
        .first()
        .and_then(|row| {
            row.underlying_value
                .or_else(|| row.ce.as_ref().and_then(|l| l.underlying_value))
                .or_else(|| row.pe.as_ref().and_then(|l| l.underlying_value))
        })
        .unwrap_or(0.0);

    let expiry_date = data
        .first()
        .and_then(|row| row.expiry_date.clone())
        .unwrap_or_default();

    let rows = data
        .into_iter()
        .filter(|row| row.ce.is_some() || row.pe.is_some())
        .map(|row| {
            let underlying_value = row
                .underlying_value
                .or_else(|| row.ce.as_ref().and_then(|l| l.underlying_value))
                .or_else(|| row.pe.as_ref().and_then(|l| l.underlying_value))
                .unwrap_or(0.0);
            ChainRow {
                strike_price: row.strike_price,
                expiry_date: row.expiry_date.clone().unwrap_or_default(),
                underlying_value,
                calls: ChainLeg::from_raw(row.ce.as_ref()),
                puts: ChainLeg::from_raw(row.pe.as_ref()),
            }
        })
        .collect();

    Ok(OptionChain {
        spot_price,
        expiry_date,
        rows,
    })
}
