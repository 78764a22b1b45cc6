//! Full-node mempool schema.
//!
//! These types mirror the JSON returned by a full node's
//! `get_all_mempool_items` endpoint. Decoding is lenient about shape and strict
//! about types: unknown fields are ignored, missing or `null` fields take their
//! zero value, and `null` entries inside `mempool_items` or `coin_spends` are
//! skipped. A field holding the wrong JSON type is an error.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`null_as_default`] for a list, also dropping `null` elements.
fn skip_null_elements<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let elements = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(elements.into_iter().flatten().flatten().collect())
}

/// Like [`null_as_default`] for a map, also dropping `null` values.
fn skip_null_values<'de, D, T>(
    deserializer: D,
) -> std::result::Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<HashMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect())
}

/// An unspent output record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coin {
    /// Value in mojos
    #[serde(deserialize_with = "null_as_default")]
    pub amount: u64,
    /// Identifier of the coin this one was created from
    #[serde(deserialize_with = "null_as_default")]
    pub parent_coin_info: String,
    /// Hash of the puzzle locking this coin
    #[serde(deserialize_with = "null_as_default")]
    pub puzzle_hash: String,
}

/// A single coin being spent, with its revealed puzzle and solution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSpend {
    /// The coin being spent
    #[serde(deserialize_with = "null_as_default")]
    pub coin: Coin,
    /// Serialized puzzle program
    #[serde(deserialize_with = "null_as_default")]
    pub puzzle_reveal: String,
    /// Serialized solution program
    #[serde(deserialize_with = "null_as_default")]
    pub solution: String,
}

/// One or more coin spends sharing a single aggregated signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendBundle {
    /// BLS aggregated signature over all spends
    #[serde(deserialize_with = "null_as_default")]
    pub aggregated_signature: String,
    /// Coin spends, in the order the node reported them
    #[serde(deserialize_with = "skip_null_elements")]
    pub coin_spends: Vec<CoinSpend>,
}

impl SpendBundle {
    /// Returns true if any coin spend in this bundle has the given parent.
    pub fn spends_child_of(&self, parent_coin_info: &str) -> bool {
        self.coin_spends
            .iter()
            .any(|cs| cs.coin.parent_coin_info == parent_coin_info)
    }
}

/// A pending mempool entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolItem {
    /// The bundle waiting for inclusion
    #[serde(deserialize_with = "null_as_default")]
    pub spend_bundle: SpendBundle,
}

/// Response body of a full node's all-mempool-items query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolSnapshot {
    /// Whether the node considered the query successful
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    /// Mempool items keyed by an opaque node-assigned id
    #[serde(deserialize_with = "skip_null_values")]
    pub mempool_items: HashMap<String, MempoolItem>,
}

impl MempoolSnapshot {
    /// Total number of coin spends across all items.
    pub fn coin_spend_count(&self) -> usize {
        self.mempool_items
            .values()
            .map(|item| item.spend_bundle.coin_spends.len())
            .sum()
    }
}

/// Caller input for a lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Parent coin id to search for
    pub parent_coin_info: String,
    /// Upstream full-node endpoint returning a [`MempoolSnapshot`]
    pub request_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SCENARIO: &str = r#"{"success":true,"mempool_items":{"i1":{"spend_bundle":{"aggregated_signature":"sig1","coin_spends":[{"coin":{"amount":100,"parent_coin_info":"0xabc","puzzle_hash":"0xp1"},"puzzle_reveal":"r1","solution":"s1"}]}}}}"#;

    #[test]
    fn test_decode_full_snapshot() {
        let snapshot: MempoolSnapshot = serde_json::from_str(SCENARIO).unwrap();
        assert!(snapshot.success);
        let bundle = &snapshot.mempool_items["i1"].spend_bundle;
        assert_eq!(bundle.aggregated_signature, "sig1");
        assert_eq!(bundle.coin_spends[0].coin.amount, 100);
        assert_eq!(bundle.coin_spends[0].coin.parent_coin_info, "0xabc");
        assert_eq!(snapshot.coin_spend_count(), 1);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let json = r#"{
            "success": true,
            "mempool_items": {
                "i1": {
                    "fee": 5,
                    "cost": 1000,
                    "spend_bundle": {"aggregated_signature": "sig", "coin_spends": [], "extra": 1}
                }
            },
            "peak": 42
        }"#;
        let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.mempool_items.len(), 1);
    }

    #[test]
    fn test_decode_failure_response_without_items() {
        let json = r#"{"success": false, "error": "node not synced"}"#;
        let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
        assert!(!snapshot.success);
        assert!(snapshot.mempool_items.is_empty());
    }

    #[test]
    fn test_decode_null_collections() {
        let json = r#"{"success": true, "mempool_items": {"i1": {"spend_bundle": {"aggregated_signature": "s", "coin_spends": null}}}}"#;
        let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.mempool_items["i1"].spend_bundle.coin_spends.is_empty());

        let json = r#"{"success": true, "mempool_items": null}"#;
        let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.mempool_items.is_empty());
    }

    #[test_case(r#"{"success": null, "mempool_items": {}}"# ; "null success")]
    #[test_case(r#"{"success": true, "mempool_items": {"i1": null}}"# ; "null item")]
    #[test_case(r#"{"success": true, "mempool_items": {"i1": {"spend_bundle": null}}}"# ; "null bundle")]
    #[test_case(r#"{"success": true, "mempool_items": {"i1": {"spend_bundle": {"aggregated_signature": null, "coin_spends": [null]}}}}"# ; "null signature and spend")]
    #[test_case(r#"{"success": true, "mempool_items": {"i1": {"spend_bundle": {"coin_spends": [{"coin": {"amount": null, "parent_coin_info": null, "puzzle_hash": null}, "puzzle_reveal": null, "solution": null}]}}}}"# ; "null coin fields")]
    fn test_decode_nulls_as_defaults(json: &str) {
        let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
        for item in snapshot.mempool_items.values() {
            assert_eq!(item.spend_bundle.aggregated_signature, "");
            for spend in &item.spend_bundle.coin_spends {
                assert_eq!(spend, &CoinSpend::default());
            }
        }
    }

    #[test]
    fn test_null_entries_are_skipped() {
        let json = r#"{
            "success": true,
            "mempool_items": {
                "gone": null,
                "i1": {"spend_bundle": {"coin_spends": [null, {"coin": {"parent_coin_info": "0xabc"}}, null]}}
            }
        }"#;
        let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.mempool_items.len(), 1);
        assert_eq!(snapshot.coin_spend_count(), 1);
        assert!(snapshot.mempool_items["i1"].spend_bundle.spends_child_of("0xabc"));
        assert!(!snapshot.mempool_items["i1"].spend_bundle.spends_child_of(""));
    }

    #[test_case(r#"{"success": "yes"}"# ; "success is a string")]
    #[test_case(r#"{"success": true, "mempool_items": []}"# ; "items is an array")]
    #[test_case(r#"{"success": true, "mempool_items": {"i": {"spend_bundle": {"coin_spends": [{"coin": {"amount": -1}}]}}}}"# ; "negative amount")]
    #[test_case(r#"{"success": true, "mempool_items": {"i": {"spend_bundle": {"coin_spends": [{"coin": {"amount": "100"}}]}}}}"# ; "amount is a string")]
    #[test_case("<html>502 Bad Gateway</html>" ; "not json")]
    fn test_decode_type_mismatch_fails(json: &str) {
        assert!(serde_json::from_str::<MempoolSnapshot>(json).is_err());
    }

    #[test]
    fn test_serialize_keeps_field_names() {
        let bundle = SpendBundle {
            aggregated_signature: "sig".into(),
            coin_spends: vec![CoinSpend {
                coin: Coin {
                    amount: 7,
                    parent_coin_info: "0xparent".into(),
                    puzzle_hash: "0xph".into(),
                },
                puzzle_reveal: "ff".into(),
                solution: "80".into(),
            }],
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "aggregated_signature": "sig",
                "coin_spends": [{
                    "coin": {"amount": 7, "parent_coin_info": "0xparent", "puzzle_hash": "0xph"},
                    "puzzle_reveal": "ff",
                    "solution": "80"
                }]
            })
        );
    }

    #[test]
    fn test_lookup_request_requires_both_fields() {
        let ok: LookupRequest =
            serde_json::from_str(r#"{"parent_coin_info": "0xabc", "request_url": "http://node"}"#).unwrap();
        assert_eq!(ok.request_url, "http://node");

        assert!(serde_json::from_str::<LookupRequest>(r#"{"parent_coin_info": "0xabc"}"#).is_err());
    }
}
