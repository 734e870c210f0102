//! Pubkey 的 base58 字符串 serde 表示
//!
//! solana-sdk 默认把 Pubkey 序列化成 32 字节数组，
//! 市场配置文件里写 base58 字符串，这里做双向转换。

use serde::{Deserialize, Deserializer};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Pubkey::from_str(&raw).map_err(serde::de::Error::custom)
}

/// Vec<Pubkey> 版本
pub fn deserialize_vec<'de, D>(deserializer: D) -> Result<Vec<Pubkey>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|value| Pubkey::from_str(value).map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use solana_sdk::pubkey::Pubkey;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize")]
        key: Pubkey,
        #[serde(deserialize_with = "super::deserialize_vec")]
        keys: Vec<Pubkey>,
    }

    #[test]
    fn base58_round_trip() {
        let raw = r#"{
            "key": "So11111111111111111111111111111111111111112",
            "keys": ["So11111111111111111111111111111111111111112"]
        }"#;
        let holder: Holder = serde_json::from_str(raw).unwrap();
        assert_eq!(holder.key, spl_token::native_mint::id());
        assert_eq!(holder.keys, vec![spl_token::native_mint::id()]);
    }

    #[test]
    fn rejects_non_base58() {
        let raw = r#"{ "key": "not-a-pubkey", "keys": [] }"#;
        assert!(serde_json::from_str::<Holder>(raw).is_err());
    }
}
