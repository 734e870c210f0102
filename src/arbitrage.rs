//! 套利编排：按固定状态机串联账户解析、编码、预算注入与提交。
//!
//! 单次调用只处理一个场所变体，任何一步的致命错误直接进入 Failed，
//! 一次运行内不做部分重试。

use log::{debug, error, info, warn};
use solana_client::rpc_client::RpcClient;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use std::sync::Arc;
use std::time::Duration;

use crate::budget::inject_compute_budget;
use crate::config::{AddressBook, Config};
use crate::error::ArbError;
use crate::instruction::{build_swap_instruction, MarketAccounts, UserAccounts};
use crate::resolver::AccountResolver;
use crate::submitter::TransactionSubmitter;
use crate::types::{ArbitrageIxData, PipelineStage};

/// 套利执行引擎
pub struct ArbitrageEngine {
    config: Arc<Config>,
    book: AddressBook,
    payer: Arc<Keypair>,
    resolver: AccountResolver,
    submitter: TransactionSubmitter,
}

impl ArbitrageEngine {
    pub fn new(config: Arc<Config>, book: AddressBook, payer: Arc<Keypair>) -> Self {
        let commitment = config.get_commitment_config();
        let rpc_client = Arc::new(RpcClient::new_with_commitment(
            config.rpc_endpoint.clone(),
            commitment,
        ));

        let resolver = AccountResolver::new(
            rpc_client.clone(),
            payer.clone(),
            book.clone(),
            commitment,
            config.allow_airdrop,
        );
        let submitter = TransactionSubmitter::new(
            rpc_client,
            payer.clone(),
            config.skip_preflight,
            commitment,
            Duration::from_secs(config.confirm_timeout_secs),
            Duration::from_millis(config.confirm_poll_interval_ms),
        );

        info!("💰 套利引擎已初始化");
        info!("   RPC 端点: {}", config.rpc_endpoint);
        info!("   钱包地址: {}", payer.pubkey());
        info!("   套利程序: {}", book.arb_program);

        Self {
            config,
            book,
            payer,
            resolver,
            submitter,
        }
    }

    /// 执行一次完整的套利流水线
    pub async fn run(
        &self,
        market: &MarketAccounts,
        args: ArbitrageIxData,
    ) -> Result<Signature, ArbError> {
        info!("═══════════════════════════════════════════");
        info!("🚀 开始执行 {} 套利", market.dex().name());
        info!("   max_bin_to_process: {}", args.max_bin_to_process);
        info!("   min_profit_threshold: {}", args.min_profit_threshold);
        info!("   no_failure: {}", args.no_failure);
        info!("═══════════════════════════════════════════");

        let mut stage = PipelineStage::Idle;
        let result = self.run_pipeline(&mut stage, market, args).await;
        match &result {
            Ok(signature) => {
                transition(&mut stage, PipelineStage::Confirmed);
                info!("🎉 {} 套利交易已确认: {}", market.dex().name(), signature);
            }
            Err(err) => {
                let failed_at = stage;
                transition(&mut stage, PipelineStage::Failed);
                report_failure(failed_at, err);
            }
        }
        result
    }

    async fn run_pipeline(
        &self,
        stage: &mut PipelineStage,
        market: &MarketAccounts,
        args: ArbitrageIxData,
    ) -> Result<Signature, ArbError> {
        let payer = self.payer.pubkey();

        // 1. 账户解析：WSOL 与目标代币的 ATA，缺失的就地创建
        transition(stage, PipelineStage::AccountsResolving);
        let atas = self
            .resolver
            .setup_token_accounts(&payer, &[self.book.wsol_mint, *market.mint()])
            .await?;
        let base_mint_acc = atas[&self.book.wsol_mint];
        let user_mint_acc = atas[market.mint()];

        // 2. 余额检查：原生 SOL 与 WSOL 各自独立
        transition(stage, PipelineStage::BalanceChecking);
        self.resolver
            .ensure_balance(
                &base_mint_acc,
                self.config.get_min_balance_lamports(),
                self.config.get_min_wrapped_balance_lamports(),
            )
            .await?;

        // 3. 指令编码（账户表校验 + 操作码改写在里面完成）
        transition(stage, PipelineStage::Encoding);
        let user = UserAccounts {
            signer: payer,
            fee_collector: base_mint_acc,
            base_mint_acc,
            user_mint_acc,
        };
        let swap_ix = build_swap_instruction(&self.book, &user, market, &args)?;

        // 4. Compute Budget 注入
        transition(stage, PipelineStage::BudgetInjecting);
        let instructions = inject_compute_budget(
            vec![swap_ix],
            self.config.compute_unit_limit,
            self.config.compute_unit_price,
        );

        // 5. 提交并等待确认
        transition(stage, PipelineStage::Submitting);
        self.submitter.submit(instructions).await
    }
}

fn transition(stage: &mut PipelineStage, next: PipelineStage) {
    debug!("状态: {} -> {}", stage.name(), next.name());
    *stage = next;
}

/// 按错误种类报告失败。可恢复种类在解析器内部就地处理，
/// 走到这里说明恢复本身不可用
fn report_failure(stage: PipelineStage, err: &ArbError) {
    match err {
        ArbError::AccountMissing(account) => {
            error!("❌ [{}] 账户缺失且无法创建: {}", stage.name(), account);
        }
        ArbError::InsufficientFunds {
            owner,
            required,
            current,
        } => {
            error!(
                "❌ [{}] 余额不足且无法补足: {} 需要 {} lamports, 当前 {}",
                stage.name(),
                owner,
                required,
                current
            );
        }
        ArbError::SchemaViolation(detail) => {
            error!(
                "❌ [{}] 账户表不符合 schema（调用方 bug，不重试）: {}",
                stage.name(),
                detail
            );
        }
        ArbError::SimulationOrExecutionFailure { detail, logs } => {
            error!("❌ [{}] 交易执行失败: {}", stage.name(), detail);
            for line in logs {
                error!("   {}", line);
            }
        }
        ArbError::Unconfirmed {
            signature,
            waited_secs,
        } => {
            warn!(
                "⏰ [{}] {}s 内未确认: {}。交易之后仍可能落地，稍后可用签名查询，不要直接重发",
                stage.name(),
                waited_secs,
                signature
            );
        }
        ArbError::Network(e) => {
            error!("❌ [{}] RPC 传输错误: {}", stage.name(), e);
        }
    }
}
