use anyhow::Result;
use log::{error, info};
use solana_sdk::signer::Signer;
use std::sync::Arc;

use solarb::arbitrage::ArbitrageEngine;
use solarb::config::{AddressBook, Config};
use solarb::instruction::MarketAccounts;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    env_logger::init();

    info!("🚀 SolArb - 链上套利执行客户端");
    info!("================================");

    // 加载配置
    let config = Arc::new(Config::from_env()?);
    config.print_summary();

    // 获取钱包
    let keypair = Arc::new(config.get_keypair()?);
    info!("Wallet: {}", keypair.as_ref().pubkey());

    // 地址表：主网默认，本地测试网可覆盖套利程序地址
    let mut book = AddressBook::mainnet();
    if let Some(program) = config.get_arb_program_override()? {
        book = book.with_arb_program(program);
    }

    // 市场账户在编码前整体校验，配置错了立刻失败
    let market = MarketAccounts::load(&config.market_config_path)?;
    let args = config.arbitrage_args()?;

    let engine = ArbitrageEngine::new(config.clone(), book, keypair);

    match engine.run(&market, args).await {
        Ok(signature) => {
            info!("✅ Swap Success: {}", signature);
            info!("🔍 tx: https://solscan.io/tx/{}", signature);
            Ok(())
        }
        Err(err) => {
            error!("❌ 套利流水线失败: {}", err);
            Err(err.into())
        }
    }
}
