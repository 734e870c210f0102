use serde::Deserialize;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

use crate::config::AddressBook;
use crate::error::ArbError;
use crate::instruction::{require_set, UserAccounts};

/// Pump AMM swap 的固定账户数量
pub const ACCOUNT_LEN: usize = 19;

/// Pump AMM 池账户（从市场配置文件加载，地址写 base58）
#[derive(Debug, Clone, Deserialize)]
pub struct PumpAmmMarket {
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub mint: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub pool: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub pool_base_token_account: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub pool_quote_token_account: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub protocol_fee_recipient: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub protocol_fee_recipient_token_account: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub coin_creator_vault_ata: Pubkey,
    #[serde(deserialize_with = "crate::serde_pubkey::deserialize")]
    pub coin_creator_vault_authority: Pubkey,
}

impl PumpAmmMarket {
    pub fn validate(&self) -> Result<(), ArbError> {
        require_set("mint", &self.mint)?;
        require_set("pool", &self.pool)?;
        require_set("pool_base_token_account", &self.pool_base_token_account)?;
        require_set("pool_quote_token_account", &self.pool_quote_token_account)?;
        require_set("protocol_fee_recipient", &self.protocol_fee_recipient)?;
        require_set(
            "protocol_fee_recipient_token_account",
            &self.protocol_fee_recipient_token_account,
        )?;
        require_set("coin_creator_vault_ata", &self.coin_creator_vault_ata)?;
        require_set(
            "coin_creator_vault_authority",
            &self.coin_creator_vault_authority,
        )?;
        Ok(())
    }
}

/// Pump AMM swap 的账户表
///
/// 顺序与链上程序逐位对齐，不能重排。可写标志取内层 CPI 的超集：
/// 池子状态只读，储备账户、协议费 token 账户和 creator vault ATA 可写。
pub(crate) fn swap_account_metas(
    book: &AddressBook,
    user: &UserAccounts,
    market: &PumpAmmMarket,
) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(user.signer, true),                              // 0: signer
        AccountMeta::new_readonly(book.wsol_mint, false),                 // 1: base_mint
        AccountMeta::new(user.fee_collector, false),                      // 2: fee_collector
        AccountMeta::new(user.base_mint_acc, false),                      // 3: base_mint_acc
        AccountMeta::new_readonly(book.token_program, false),             // 4: token_program
        AccountMeta::new_readonly(book.system_program, false),            // 5: system_program
        AccountMeta::new_readonly(book.associated_token_program, false),  // 6: associated_token_program
        AccountMeta::new_readonly(market.mint, false),                    // 7: mint
        AccountMeta::new(user.user_mint_acc, false),                      // 8: user_mint_acc
        AccountMeta::new_readonly(book.pump_amm_program, false),          // 9: pump_program
        AccountMeta::new_readonly(book.pump_global_config, false),        // 10: pump_global_config
        AccountMeta::new_readonly(book.pump_event_authority, false),      // 11: pump_event_authority
        AccountMeta::new_readonly(market.protocol_fee_recipient, false),  // 12: protocol_fee_recipient
        AccountMeta::new_readonly(market.pool, false),                    // 13: pool
        AccountMeta::new(market.pool_base_token_account, false),          // 14: pool_base_token_account
        AccountMeta::new(market.pool_quote_token_account, false),         // 15: pool_quote_token_account
        AccountMeta::new(market.protocol_fee_recipient_token_account, false), // 16: protocol_fee_recipient_token_account
        AccountMeta::new(market.coin_creator_vault_ata, false),           // 17: coin_creator_vault_ata
        AccountMeta::new_readonly(market.coin_creator_vault_authority, false), // 18: coin_creator_vault_authority
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn market() -> PumpAmmMarket {
        PumpAmmMarket {
            mint: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            pool_base_token_account: Pubkey::new_unique(),
            pool_quote_token_account: Pubkey::new_unique(),
            protocol_fee_recipient: Pubkey::new_unique(),
            protocol_fee_recipient_token_account: Pubkey::new_unique(),
            coin_creator_vault_ata: Pubkey::new_unique(),
            coin_creator_vault_authority: Pubkey::new_unique(),
        }
    }

    fn user() -> UserAccounts {
        UserAccounts {
            signer: Pubkey::new_unique(),
            fee_collector: Pubkey::new_unique(),
            base_mint_acc: Pubkey::new_unique(),
            user_mint_acc: Pubkey::new_unique(),
        }
    }

    #[test]
    fn account_order_matches_schema() {
        let book = AddressBook::mainnet();
        let user = user();
        let market = market();
        let metas = swap_account_metas(&book, &user, &market);
        assert_eq!(metas.len(), ACCOUNT_LEN);

        let expected = vec![
            user.signer,
            book.wsol_mint,
            user.fee_collector,
            user.base_mint_acc,
            book.token_program,
            book.system_program,
            book.associated_token_program,
            market.mint,
            user.user_mint_acc,
            book.pump_amm_program,
            book.pump_global_config,
            book.pump_event_authority,
            market.protocol_fee_recipient,
            market.pool,
            market.pool_base_token_account,
            market.pool_quote_token_account,
            market.protocol_fee_recipient_token_account,
            market.coin_creator_vault_ata,
            market.coin_creator_vault_authority,
        ];
        let actual: Vec<Pubkey> = metas.iter().map(|meta| meta.pubkey).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn signer_and_writable_flags() {
        let book = AddressBook::mainnet();
        let metas = swap_account_metas(&book, &user(), &market());

        for (index, meta) in metas.iter().enumerate() {
            assert_eq!(meta.is_signer, index == 0, "index {index}");
        }

        let writable: Vec<usize> = metas
            .iter()
            .enumerate()
            .filter(|(_, meta)| meta.is_writable)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(writable, vec![0, 2, 3, 8, 14, 15, 16, 17]);
    }

    #[test]
    fn validate_rejects_unset_account() {
        let mut market = market();
        market.coin_creator_vault_ata = Pubkey::default();
        assert!(market.validate().is_err());
    }
}
