use serde::Deserialize;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

use crate::config::AddressBook;
use crate::error::ArbError;
use crate::instruction::{require_set, UserAccounts};

/// DLMM swap 的固定账户数量
pub const ACCOUNT_LEN: usize = 18;

/// DLMM swap 需要的 bin array 数量
pub const BIN_ARRAY_LEN: usize = 3;

/// Meteora DLMM 池账户（从市场配置文件加载，地址写 base58）
#[derive(Debug, Clone, Deserialize)]
pub struct DlmmMarket {
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub mint: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub lb_pair: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub reserve_x: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub reserve_y: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub oracle: Pubkey,
    /// 流动性 bin array，必须恰好 3 个
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize_vec")]
    pub bin_arrays: Vec<Pubkey>,
}

impl DlmmMarket {
    pub fn validate(&self) -> Result<(), ArbError> {
        if self.bin_arrays.len() != BIN_ARRAY_LEN {
            return Err(ArbError::SchemaViolation(format!(
                "DLMM 需要恰好 {BIN_ARRAY_LEN} 个 bin array，实际 {}",
                self.bin_arrays.len()
            )));
        }
        require_set("mint", &self.mint)?;
        require_set("lb_pair", &self.lb_pair)?;
        require_set("reserve_x", &self.reserve_x)?;
        require_set("reserve_y", &self.reserve_y)?;
        require_set("oracle", &self.oracle)?;
        for (index, bin_array) in self.bin_arrays.iter().enumerate() {
            require_set(&format!("bin_arrays[{index}]"), bin_array)?;
        }
        Ok(())
    }
}

/// DLMM swap 的账户表
///
/// 顺序与链上程序逐位对齐，不能重排。调用前必须先通过 validate。
pub(crate) fn swap_account_metas(
    book: &AddressBook,
    user: &UserAccounts,
    market: &DlmmMarket,
) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(user.signer, true),                             // 0: signer
        AccountMeta::new_readonly(book.wsol_mint, false),                // 1: base_mint
        AccountMeta::new(user.fee_collector, false),                     // 2: fee_collector
        AccountMeta::new(user.base_mint_acc, false),                     // 3: base_mint_acc
        AccountMeta::new_readonly(book.token_program, false),            // 4: token_program
        AccountMeta::new_readonly(book.system_program, false),           // 5: system_program
        AccountMeta::new_readonly(book.associated_token_program, false), // 6: associated_token_program
        AccountMeta::new_readonly(market.mint, false),                   // 7: mint
        AccountMeta::new(user.user_mint_acc, false),                     // 8: user_mint_acc
        AccountMeta::new_readonly(book.dlmm_program, false),             // 9: dlmm_program
        AccountMeta::new_readonly(book.dlmm_event_authority, false),     // 10: dlmm_event_authority
        AccountMeta::new(market.lb_pair, false),                         // 11: lb_pair
        AccountMeta::new(market.reserve_x, false),                       // 12: reserve_x
        AccountMeta::new(market.reserve_y, false),                       // 13: reserve_y
        AccountMeta::new(market.oracle, false),                          // 14: oracle
        AccountMeta::new(market.bin_arrays[0], false),                   // 15: bin1
        AccountMeta::new(market.bin_arrays[1], false),                   // 16: bin2
        AccountMeta::new(market.bin_arrays[2], false),                   // 17: bin3
    ]
}
