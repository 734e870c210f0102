// lib.rs - 导出公共接口供集成测试使用

pub mod arbitrage;
pub mod budget;
pub mod config;
pub mod error;
pub mod instruction;
pub mod resolver;
pub mod serde_pubkey;
pub mod submitter;
pub mod types;

// 重新导出常用类型
pub use config::{AddressBook, Config};
pub use error::ArbError;
pub use instruction::{
    build_swap_instruction, DlmmMarket, MarketAccounts, PumpAmmMarket, UserAccounts,
    DEX_SWAP_OPCODE,
};
pub use types::{ArbitrageIxData, PipelineStage, SupportDex};
