//! Decoding of loosely typed storage payloads into canonical raw shapes.
//!
//! Chain clients hand over JSON-like values whose field names and number
//! encodings differ between runtimes. Every alias is resolved here, so the
//! adapters only ever see the structs below.

use crate::{errors::DecodeError, types::U256};
use serde::{
    de::{self, Unexpected, Visitor},
    Deserialize, Deserializer,
};
use serde_aux::field_attributes::deserialize_bool_from_anything;
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

/// Balance accepting integers, decimal strings and `0x` hex strings.
/// `null` decodes to zero.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct RawBalance(pub U256);

fn parse_balance(s: &str) -> Option<U256> {
    let s = s.trim();

    match s.strip_prefix("0x") {
        Some("") => Some(U256::zero()),
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(s).ok(),
    }
}

struct RawBalanceVisitor;

impl<'de> Visitor<'de> for RawBalanceVisitor {
    type Value = RawBalance;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an unsigned integer, a decimal string or a 0x-prefixed hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(RawBalance(U256::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(RawBalance(U256::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        if v < 0 {
            return Err(E::invalid_value(Unexpected::Signed(v), &self));
        }

        Ok(RawBalance(U256::from(v as u64)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_balance(v)
            .map(RawBalance)
            .ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawBalance::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawBalance::default())
    }
}

impl<'de> Deserialize<'de> for RawBalance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawBalanceVisitor)
    }
}

/// `system.account` data. Runtimes that merged the two frozen fields report
/// a single `frozen`, read here as `misc_frozen`.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountData {
    pub free: RawBalance,
    pub reserved: RawBalance,
    #[serde(alias = "frozen")]
    pub misc_frozen: RawBalance,
    pub fee_frozen: RawBalance,
}

#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolMember {
    pub points: RawBalance,
    pub unbonding_eras: BTreeMap<String, RawBalance>,
}

impl PoolMember {
    /// Active points plus everything still unbonding.
    pub fn pooled(&self) -> U256 {
        self.unbonding_eras
            .values()
            .fold(self.points.0, |acc, v| acc.saturating_add(v.0))
    }
}

/// Entry of a `tokens`/`currencies` style ledger, where `free` is the total.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenAccount {
    pub free: RawBalance,
    pub reserved: RawBalance,
    #[serde(alias = "miscFrozen")]
    pub frozen: RawBalance,
}

/// Entry of an `assets` or `foreignAssets` ledger.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetAccount {
    pub balance: RawBalance,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub is_frozen: bool,
    pub status: Option<String>,
}

impl AssetAccount {
    pub fn frozen(&self) -> bool {
        self.is_frozen
            || matches!(
                self.status.as_deref().map(str::to_ascii_lowercase).as_deref(),
                Some("frozen") | Some("blocked")
            )
    }
}

pub fn decode<T>(value: &Value) -> Result<T, DecodeError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }

    Ok(T::deserialize(value)?)
}

/// `system.account` values may come wrapped in `AccountInfo`.
pub fn decode_account(value: &Value) -> Result<AccountData, DecodeError> {
    decode(value.get("data").unwrap_or(value))
}

/// Pairs each decoded entry with the address it was queried for. Entries
/// missing from a short tick are reported as decode failures.
pub fn key_by_address<T, F>(
    addresses: &[String],
    values: &[Value],
    decoder: F,
) -> HashMap<String, Result<T, DecodeError>>
where
    F: Fn(&Value) -> Result<T, DecodeError>,
{
    if values.len() != addresses.len() {
        log::warn!(
            "feed returned {} entries for {} addresses",
            values.len(),
            addresses.len()
        );
    }

    addresses
        .iter()
        .enumerate()
        .map(|(idx, address)| {
            let decoded = match values.get(idx) {
                Some(value) => decoder(value),
                None => Err(DecodeError::LengthMismatch {
                    expected: addresses.len(),
                    got: values.len(),
                }),
            };

            (address.clone(), decoded)
        })
        .collect()
}
