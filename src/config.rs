use anyhow::{Context, Result};
use serde::Deserialize;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

use crate::types::{ArbitrageIxData, SupportDex};

// 链上程序地址（主网）
const ARB_PROGRAM_ID: &str = "D7Nv2Yt9i7r1xSGgTZo9zGHgZ8wwiAX13nFodBXdpox4";
const DLMM_PROGRAM_ID: &str = "LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo";
const DLMM_EVENT_AUTHORITY: &str = "D1ZN9Wj1fRSUQfCjhvnu1hqDMT7hzjzBBpi12nVniYD6";
const PUMP_AMM_PROGRAM_ID: &str = "pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA";
const PUMP_GLOBAL_CONFIG: &str = "ADyA8hdefvWN2dbGGWFotbzWxrAvLW83WG6QCVXvJKqw";
const PUMP_EVENT_AUTHORITY: &str = "GS4CU59F31iL7aR2Q8zVS8DRrcRnXX1yjQ66TqNVQnaR";

/// 全局配置
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // 网络配置
    pub rpc_endpoint: String,
    pub commitment_level: String,
    pub skip_preflight: bool,

    // 钱包配置
    pub wallet_private_key: String,

    // 套利目标配置
    pub dex: String,
    pub market_config_path: String,
    /// 本地测试网部署时覆盖套利程序地址
    pub arb_program_id: Option<String>,

    // 指令参数
    pub max_bin_to_process: u64,
    pub min_profit_threshold: u64,
    pub no_failure: bool,

    // Compute Budget 配置
    pub compute_unit_limit: Option<u32>,
    pub compute_unit_price: Option<u64>,

    // 余额与资助配置
    pub min_balance_sol: f64,
    pub min_wrapped_balance_sol: f64,
    /// 仅 dev/test 网络：余额不足时请求空投
    pub allow_airdrop: bool,

    // 确认配置
    pub confirm_timeout_secs: u64,
    pub confirm_poll_interval_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let config = envy::from_env::<Config>()
            .context("Failed to load configuration from environment variables")?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置参数
    fn validate(&self) -> Result<()> {
        if self.rpc_endpoint.is_empty() {
            anyhow::bail!("rpc_endpoint must not be empty");
        }

        if self.market_config_path.is_empty() {
            anyhow::bail!("market_config_path must not be empty");
        }

        // dex 必须是受支持的场所
        self.get_dex()?;

        if let Some(0) = self.compute_unit_limit {
            anyhow::bail!("compute_unit_limit must be > 0");
        }

        if self.min_balance_sol < 0.0 {
            anyhow::bail!("min_balance_sol must be >= 0");
        }

        if self.min_wrapped_balance_sol < 0.0 {
            anyhow::bail!("min_wrapped_balance_sol must be >= 0");
        }

        if self.confirm_timeout_secs == 0 {
            anyhow::bail!("confirm_timeout_secs must be > 0");
        }

        if self.confirm_poll_interval_ms == 0 {
            anyhow::bail!("confirm_poll_interval_ms must be > 0");
        }

        Ok(())
    }

    /// 获取钱包 Keypair
    pub fn get_keypair(&self) -> Result<Keypair> {
        let keypair = Keypair::from_base58_string(&self.wallet_private_key);
        Ok(keypair)
    }

    /// 获取 CommitmentConfig
    pub fn get_commitment_config(&self) -> CommitmentConfig {
        match self.commitment_level.to_lowercase().as_str() {
            "processed" => CommitmentConfig::processed(),
            "confirmed" => CommitmentConfig::confirmed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => {
                log::warn!(
                    "⚠️  未知的 commitment_level: {}, 使用默认值 'confirmed'",
                    self.commitment_level
                );
                CommitmentConfig::confirmed()
            }
        }
    }

    /// 获取目标场所
    pub fn get_dex(&self) -> Result<SupportDex> {
        match self.dex.to_lowercase().as_str() {
            "pump_amm" | "pump" => Ok(SupportDex::PumpAmm),
            "dlmm" => Ok(SupportDex::Dlmm),
            other => anyhow::bail!("dex must be one of: pump_amm, dlmm (got {other})"),
        }
    }

    /// 由配置组装套利指令参数
    pub fn arbitrage_args(&self) -> Result<ArbitrageIxData> {
        Ok(ArbitrageIxData {
            dex: self.get_dex()?,
            max_bin_to_process: self.max_bin_to_process,
            min_profit_threshold: self.min_profit_threshold,
            no_failure: self.no_failure,
        })
    }

    /// 套利程序地址覆盖（未配置时用主网默认值）
    pub fn get_arb_program_override(&self) -> Result<Option<Pubkey>> {
        match &self.arb_program_id {
            Some(value) => {
                let program = Pubkey::try_from(value.as_str())
                    .ok()
                    .with_context(|| format!("Invalid arb_program_id: {value}"))?;
                Ok(Some(program))
            }
            None => Ok(None),
        }
    }

    /// 最低原生余额（lamports）
    pub fn get_min_balance_lamports(&self) -> u64 {
        (self.min_balance_sol * 1_000_000_000.0) as u64
    }

    /// 最低 WSOL 账户余额（lamports）
    pub fn get_min_wrapped_balance_lamports(&self) -> u64 {
        (self.min_wrapped_balance_sol * 1_000_000_000.0) as u64
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        log::info!("=== Configuration Summary ===");
        log::info!("Network:");
        log::info!("  RPC: {}", self.rpc_endpoint);
        log::info!("  Commitment: {}", self.commitment_level);
        log::info!("  Skip Preflight: {}", self.skip_preflight);
        log::info!("");
        log::info!("Arbitrage:");
        log::info!("  Dex: {}", self.dex);
        log::info!("  Market Config: {}", self.market_config_path);
        log::info!("  Max Bin To Process: {}", self.max_bin_to_process);
        log::info!("  Min Profit Threshold: {}", self.min_profit_threshold);
        log::info!("  No Failure: {}", self.no_failure);
        log::info!("");
        log::info!("Compute Budget:");
        match self.compute_unit_limit {
            Some(limit) => log::info!("  CU Limit: {}", limit),
            None => log::info!("  CU Limit: (not set)"),
        }
        match self.compute_unit_price {
            Some(price) => log::info!("  CU Price: {}", price),
            None => log::info!("  CU Price: (not set)"),
        }
        log::info!("");
        log::info!("Funding:");
        log::info!("  Min Balance: {} SOL", self.min_balance_sol);
        log::info!("  Min Wrapped Balance: {} SOL", self.min_wrapped_balance_sol);
        log::info!("  Allow Airdrop: {}", self.allow_airdrop);
        log::info!("");
        log::info!("Confirmation:");
        log::info!("  Timeout: {}s", self.confirm_timeout_secs);
        log::info!("  Poll Interval: {}ms", self.confirm_poll_interval_ms);
        log::info!("=============================");
    }
}

/// 进程级地址表：公共程序与代币地址，作为不可变配置注入流水线。
/// 测试或本地网络用构造器替换，不做全局状态。
#[derive(Debug, Clone)]
pub struct AddressBook {
    pub arb_program: Pubkey,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
    pub associated_token_program: Pubkey,
    pub wsol_mint: Pubkey,
    pub dlmm_program: Pubkey,
    pub dlmm_event_authority: Pubkey,
    pub pump_amm_program: Pubkey,
    pub pump_global_config: Pubkey,
    pub pump_event_authority: Pubkey,
}

impl AddressBook {
    /// 主网地址表
    pub fn mainnet() -> Self {
        Self {
            arb_program: Pubkey::try_from(ARB_PROGRAM_ID).expect("Invalid arb program ID"),
            token_program: spl_token::id(),
            system_program: solana_system_interface::program::ID,
            associated_token_program: spl_associated_token_account::id(),
            wsol_mint: spl_token::native_mint::id(),
            dlmm_program: Pubkey::try_from(DLMM_PROGRAM_ID).expect("Invalid DLMM program ID"),
            dlmm_event_authority: Pubkey::try_from(DLMM_EVENT_AUTHORITY)
                .expect("Invalid DLMM event authority"),
            pump_amm_program: Pubkey::try_from(PUMP_AMM_PROGRAM_ID)
                .expect("Invalid Pump AMM program ID"),
            pump_global_config: Pubkey::try_from(PUMP_GLOBAL_CONFIG)
                .expect("Invalid Pump global config"),
            pump_event_authority: Pubkey::try_from(PUMP_EVENT_AUTHORITY)
                .expect("Invalid Pump event authority"),
        }
    }

    /// 覆盖套利程序地址（本地测试网部署时使用）
    pub fn with_arb_program(mut self, program: Pubkey) -> Self {
        self.arb_program = program;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_config() -> Config {
        Config {
            rpc_endpoint: "http://127.0.0.1:8899".to_string(),
            commitment_level: "confirmed".to_string(),
            skip_preflight: true,
            wallet_private_key: String::new(),
            dex: "dlmm".to_string(),
            market_config_path: "market.json".to_string(),
            arb_program_id: None,
            max_bin_to_process: 20,
            min_profit_threshold: 10,
            no_failure: true,
            compute_unit_limit: Some(400_000),
            compute_unit_price: None,
            min_balance_sol: 10.0,
            min_wrapped_balance_sol: 0.0,
            allow_airdrop: true,
            confirm_timeout_secs: 30,
            confirm_poll_interval_ms: 500,
        }
    }

    #[test]
    fn validate_accepts_sane_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_dex() {
        let mut config = test_config();
        config.dex = "raydium".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_compute_unit_limit() {
        let mut config = test_config();
        config.compute_unit_limit = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn arbitrage_args_maps_fields() {
        let args = test_config().arbitrage_args().unwrap();
        assert_eq!(args.dex, SupportDex::Dlmm);
        assert_eq!(args.max_bin_to_process, 20);
        assert_eq!(args.min_profit_threshold, 10);
        assert!(args.no_failure);
    }

    #[test]
    fn commitment_parse_falls_back_to_confirmed() {
        let mut config = test_config();
        config.commitment_level = "whatever".to_string();
        assert_eq!(
            config.get_commitment_config(),
            CommitmentConfig::confirmed()
        );
    }

    #[test]
    fn mainnet_address_book_is_consistent() {
        let book = AddressBook::mainnet();
        assert_eq!(book.wsol_mint, spl_token::native_mint::id());
        assert_eq!(
            book.arb_program,
            Pubkey::try_from(ARB_PROGRAM_ID).unwrap()
        );
    }
}
