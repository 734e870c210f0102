//! 套利指令编码
//!
//! 每个场所一套固定的账户 schema，顺序与链上程序逐位对齐，不能重排。
//! 负载按「场所判别字节 + Borsh 序列化参数」编码，编码完成后首字节
//! 统一改写为 DexSwap 操作码。

pub mod dlmm;
pub mod pump_amm;

pub use dlmm::DlmmMarket;
pub use pump_amm::PumpAmmMarket;

use log::debug;
use serde::Deserialize;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

use crate::config::AddressBook;
use crate::error::ArbError;
use crate::types::{ArbitrageIxData, SupportDex};

/// 入口程序按负载首字节分发，所有 swap 都走 DexSwap = 0
pub const DEX_SWAP_OPCODE: u8 = 0;

/// ArbitrageIxData 序列化后的长度（dex 标签 + 两个 u64 + no_failure）
pub const ARBITRAGE_IX_DATA_LEN: usize = 18;

/// 场所市场账户（池子相关地址，从市场配置文件加载）
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "dex", rename_all = "snake_case")]
pub enum MarketAccounts {
    PumpAmm(PumpAmmMarket),
    Dlmm(DlmmMarket),
}

impl MarketAccounts {
    pub fn dex(&self) -> SupportDex {
        match self {
            MarketAccounts::PumpAmm(_) => SupportDex::PumpAmm,
            MarketAccounts::Dlmm(_) => SupportDex::Dlmm,
        }
    }

    /// 目标代币 mint
    pub fn mint(&self) -> &Pubkey {
        match self {
            MarketAccounts::PumpAmm(market) => &market.mint,
            MarketAccounts::Dlmm(market) => &market.mint,
        }
    }

    /// 从 JSON 文件加载市场账户，内容不合法在编码前报错
    pub fn load(path: &str) -> Result<Self, ArbError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ArbError::SchemaViolation(format!("无法读取市场配置 {path}: {e}"))
        })?;
        let market: MarketAccounts = serde_json::from_str(&raw)
            .map_err(|e| ArbError::SchemaViolation(format!("市场配置解析失败: {e}")))?;
        market.validate()?;
        Ok(market)
    }

    /// 账户齐全性检查
    pub fn validate(&self) -> Result<(), ArbError> {
        match self {
            MarketAccounts::PumpAmm(market) => market.validate(),
            MarketAccounts::Dlmm(market) => market.validate(),
        }
    }
}

/// 钱包侧账户（由账户解析器派生）
#[derive(Debug, Clone, Copy)]
pub struct UserAccounts {
    pub signer: Pubkey,
    pub fee_collector: Pubkey,
    /// 用户的 WSOL ATA
    pub base_mint_acc: Pubkey,
    /// 用户的目标代币 ATA
    pub user_mint_acc: Pubkey,
}

/// 构建一条 swap 指令：schema 编码 + 操作码改写
///
/// 账户表在构建前整体校验，缺失/多余的账户不会产出半成品指令。
pub fn build_swap_instruction(
    book: &AddressBook,
    user: &UserAccounts,
    market: &MarketAccounts,
    args: &ArbitrageIxData,
) -> Result<Instruction, ArbError> {
    if args.dex != market.dex() {
        return Err(ArbError::SchemaViolation(format!(
            "参数 dex ({}) 与市场账户 ({}) 不一致",
            args.dex.name(),
            market.dex().name()
        )));
    }
    market.validate()?;

    let (accounts, schema_len) = match market {
        MarketAccounts::PumpAmm(m) => (pump_amm::swap_account_metas(book, user, m), pump_amm::ACCOUNT_LEN),
        MarketAccounts::Dlmm(m) => (dlmm::swap_account_metas(book, user, m), dlmm::ACCOUNT_LEN),
    };
    if accounts.len() != schema_len {
        return Err(ArbError::SchemaViolation(format!(
            "{} 账户表长度 {} 不等于 schema 要求的 {}",
            market.dex().name(),
            accounts.len(),
            schema_len
        )));
    }

    let mut data = encode_ix_data(args)?;
    // 通用编码器按场所变体选择判别字节，但链上程序只认 DexSwap 入口，
    // 场所标签由负载第二个字节承载。这里统一改写首字节，不要移除。
    data[0] = DEX_SWAP_OPCODE;

    debug!(
        "已编码 {} swap 指令: {} 个账户, {} 字节负载",
        market.dex().name(),
        accounts.len(),
        data.len()
    );

    Ok(Instruction {
        program_id: book.arb_program,
        accounts,
        data,
    })
}

/// schema 编码：场所自身的指令判别字节 + Borsh 序列化的参数
fn encode_ix_data(args: &ArbitrageIxData) -> Result<Vec<u8>, ArbError> {
    let mut data = Vec::with_capacity(1 + ARBITRAGE_IX_DATA_LEN);
    data.push(args.dex.tag());
    let payload = borsh::to_vec(args)
        .map_err(|e| ArbError::SchemaViolation(format!("指令参数序列化失败: {e}")))?;
    data.extend_from_slice(&payload);
    debug_assert_eq!(data.len(), 1 + ARBITRAGE_IX_DATA_LEN);
    Ok(data)
}

/// 市场配置里不允许出现未设置（默认值）的地址
pub(crate) fn require_set(name: &str, key: &Pubkey) -> Result<(), ArbError> {
    if *key == Pubkey::default() {
        return Err(ArbError::SchemaViolation(format!("账户 {name} 未设置")));
    }
    Ok(())
}
