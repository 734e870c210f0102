//! 交易提交：取 blockhash、签名、发送、轮询确认。
//!
//! 本层不做重试：blockhash 过期或部分状态变更可能导致重复提交，
//! 要不要整体重跑流水线由调用方决定。

use log::{debug, info, warn};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::TransactionStatus;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ArbError;

/// 交易提交器
pub struct TransactionSubmitter {
    rpc_client: Arc<RpcClient>,
    payer: Arc<Keypair>,
    skip_preflight: bool,
    commitment: CommitmentConfig,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl TransactionSubmitter {
    pub fn new(
        rpc_client: Arc<RpcClient>,
        payer: Arc<Keypair>,
        skip_preflight: bool,
        commitment: CommitmentConfig,
        confirm_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            rpc_client,
            payer,
            skip_preflight,
            commitment,
            confirm_timeout,
            poll_interval,
        }
    }

    /// 组装、签名并发送交易，轮询到配置的 commitment 或超时
    pub async fn submit(&self, instructions: Vec<Instruction>) -> Result<Signature, ArbError> {
        // blockhash 必须在签名前夕获取，避免过期
        let (blockhash, _) = self
            .rpc_client
            .get_latest_blockhash_with_commitment(self.commitment)?;
        let mut transaction =
            Transaction::new_with_payer(&instructions, Some(&self.payer.pubkey()));
        transaction.sign(&[self.payer.as_ref()], blockhash);

        info!(
            "📤 发送交易 ({} 条指令, skip_preflight={}, commitment={:?})",
            instructions.len(),
            self.skip_preflight,
            self.commitment.commitment
        );
        let config = RpcSendTransactionConfig {
            skip_preflight: self.skip_preflight,
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        let signature = self
            .rpc_client
            .send_transaction_with_config(&transaction, config)
            .map_err(ArbError::from_client_error)?;
        info!("✅ 交易已发送: {}", signature);

        self.wait_for_confirmation(&signature).await?;
        Ok(signature)
    }

    /// 轮询交易状态直到满足 commitment 或超时
    ///
    /// 超时返回 Unconfirmed。非终态：交易之后仍可能落地，
    /// 调用方可以拿签名稍后查询，但不能盲目重发。
    async fn wait_for_confirmation(&self, signature: &Signature) -> Result<(), ArbError> {
        let start = Instant::now();

        while start.elapsed() < self.confirm_timeout {
            match self.rpc_client.get_signature_statuses(&[*signature]) {
                Ok(response) => {
                    let statuses: Vec<Option<TransactionStatus>> = response.value;
                    if let Some(status) = statuses.into_iter().next().flatten() {
                        if let Some(err) = &status.err {
                            return Err(ArbError::SimulationOrExecutionFailure {
                                detail: err.to_string(),
                                logs: Vec::new(),
                            });
                        }
                        if status.satisfies_commitment(self.commitment) {
                            info!(
                                "🎉 交易已确认 (耗时 {:.1}s): {}",
                                start.elapsed().as_secs_f64(),
                                signature
                            );
                            return Ok(());
                        }
                    }
                    debug!("⏳ 交易尚未确认，继续等待...");
                }
                Err(e) => {
                    warn!("⚠️  查询交易状态失败: {}", e);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        warn!(
            "⏰ 交易确认超时 ({}s): {}",
            self.confirm_timeout.as_secs(),
            signature
        );
        Err(ArbError::Unconfirmed {
            signature: *signature,
            waited_secs: self.confirm_timeout.as_secs(),
        })
    }
}
