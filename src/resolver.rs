//! 账户解析：派生/创建关联代币账户（ATA），检查并补足余额。
//!
//! 创建走链上的幂等 ATA 指令，和并发调用者撞车时链上视为 no-op，
//! 不会让流水线失败。

use log::{debug, info, warn};
use solana_client::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AddressBook;
use crate::error::ArbError;

const AIRDROP_CONFIRM_ATTEMPTS: u32 = 30;
const AIRDROP_CONFIRM_INTERVAL: Duration = Duration::from_secs(1);

/// 账户解析器
pub struct AccountResolver {
    rpc_client: Arc<RpcClient>,
    payer: Arc<Keypair>,
    book: AddressBook,
    commitment: CommitmentConfig,
    allow_airdrop: bool,
}

impl AccountResolver {
    pub fn new(
        rpc_client: Arc<RpcClient>,
        payer: Arc<Keypair>,
        book: AddressBook,
        commitment: CommitmentConfig,
        allow_airdrop: bool,
    ) -> Self {
        Self {
            rpc_client,
            payer,
            book,
            commitment,
            allow_airdrop,
        }
    }

    /// 派生 (owner, mint) 的规范 ATA 地址。确定性：同一输入永远同一地址
    pub fn derive_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        spl_associated_token_account::get_associated_token_address(owner, mint)
    }

    /// 确保 (owner, mint) 的 ATA 存在并返回地址
    ///
    /// 幂等：重复调用返回同一地址，已存在时不会再发创建交易。
    pub async fn ensure_token_account(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Pubkey, ArbError> {
        let ata = Self::derive_associated_token_address(owner, mint);
        if self.account_exists(&ata)? {
            debug!("ATA 已存在: {} (mint {})", ata, mint);
            return Ok(ata);
        }

        info!("📦 创建 ATA: {} (mint {})", ata, mint);
        let ix = self.create_ata_instruction(owner, mint);
        self.send_prepare_transaction(vec![ix]).await?;

        // 创建交易已确认但账户仍不存在时不再继续
        if !self.account_exists(&ata)? {
            return Err(ArbError::AccountMissing(ata));
        }
        Ok(ata)
    }

    /// 批量确保多个 mint 的 ATA，缺失的合并进一笔准备交易。
    /// 返回 mint → ATA 地址映射
    pub async fn setup_token_accounts(
        &self,
        owner: &Pubkey,
        mints: &[Pubkey],
    ) -> Result<HashMap<Pubkey, Pubkey>, ArbError> {
        let atas: Vec<Pubkey> = mints
            .iter()
            .map(|mint| Self::derive_associated_token_address(owner, mint))
            .collect();

        let infos = self.rpc_client.get_multiple_accounts(&atas)?;
        let mut create_ixs = Vec::new();
        let mut created = Vec::new();
        for ((mint, ata), info) in mints.iter().zip(&atas).zip(&infos) {
            if info.is_none() {
                info!("📦 创建 ATA: {} (mint {})", ata, mint);
                create_ixs.push(self.create_ata_instruction(owner, mint));
                created.push(*ata);
            } else {
                debug!("ATA 已存在: {} (mint {})", ata, mint);
            }
        }

        if !create_ixs.is_empty() {
            self.send_prepare_transaction(create_ixs).await?;
            let infos = self.rpc_client.get_multiple_accounts(&created)?;
            for (ata, info) in created.iter().zip(&infos) {
                if info.is_none() {
                    return Err(ArbError::AccountMissing(*ata));
                }
            }
        }

        Ok(mints.iter().copied().zip(atas).collect())
    }

    /// 检查并补足余额：原生 SOL 与 WSOL 账户各自独立检查。
    /// 仅当余额严格低于阈值时发起一次资助请求，等于阈值不触发
    pub async fn ensure_balance(
        &self,
        wsol_ata: &Pubkey,
        min_native: u64,
        min_wrapped: u64,
    ) -> Result<(), ArbError> {
        let owner = self.payer.pubkey();

        let native = self.rpc_client.get_balance(&owner)?;
        debug!("原生余额: {} lamports (阈值 {})", native, min_native);
        if let Some(amount) = funding_shortfall(native, min_native) {
            self.request_native_funding(amount, native).await?;
        }

        if min_wrapped > 0 {
            let wrapped = self.token_balance(wsol_ata)?;
            debug!("WSOL 余额: {} lamports (阈值 {})", wrapped, min_wrapped);
            if let Some(amount) = funding_shortfall(wrapped, min_wrapped) {
                self.wrap_native(wsol_ata, amount).await?;
            }
        }

        Ok(())
    }

    fn create_ata_instruction(&self, owner: &Pubkey, mint: &Pubkey) -> Instruction {
        spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            &self.payer.pubkey(),
            owner,
            mint,
            &self.book.token_program,
        )
    }

    fn account_exists(&self, address: &Pubkey) -> Result<bool, ArbError> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.commitment)?;
        Ok(response.value.is_some())
    }

    fn token_balance(&self, token_account: &Pubkey) -> Result<u64, ArbError> {
        match self.rpc_client.get_token_account_balance(token_account) {
            Ok(balance) => balance.amount.parse::<u64>().map_err(|e| {
                ArbError::SchemaViolation(format!("token 余额解析失败: {e}"))
            }),
            Err(e) => {
                // 账户还没到手或暂时查不到时按 0 处理，后续路径自己决定是否补足
                warn!("⚠️  获取 token 余额失败: {e}");
                Ok(0)
            }
        }
    }

    /// 原生余额资助：仅限 dev/test 网络的空投。
    /// 资助不可用对整条流水线是致命的，不做重试
    async fn request_native_funding(&self, amount: u64, current: u64) -> Result<(), ArbError> {
        let owner = self.payer.pubkey();
        if !self.allow_airdrop {
            return Err(ArbError::InsufficientFunds {
                owner,
                required: amount,
                current,
            });
        }

        warn!(
            "⚠️  余额不足 ({} lamports)，请求空投 {} lamports",
            current, amount
        );
        let signature = self.rpc_client.request_airdrop(&owner, amount)?;

        for _ in 0..AIRDROP_CONFIRM_ATTEMPTS {
            if self.rpc_client.confirm_transaction(&signature)? {
                info!("✅ 空投已确认: {}", signature);
                return Ok(());
            }
            tokio::time::sleep(AIRDROP_CONFIRM_INTERVAL).await;
        }

        Err(ArbError::InsufficientFunds {
            owner,
            required: amount,
            current,
        })
    }

    /// 把原生 SOL 包装进 WSOL 账户：转账 + sync_native，一笔准备交易
    async fn wrap_native(&self, wsol_ata: &Pubkey, amount: u64) -> Result<(), ArbError> {
        info!("💰 包装 {} lamports 到 WSOL 账户 {}", amount, wsol_ata);
        let transfer_ix = solana_system_interface::instruction::transfer(
            &self.payer.pubkey(),
            wsol_ata,
            amount,
        );
        let sync_ix = spl_token::instruction::sync_native(&self.book.token_program, wsol_ata)
            .map_err(|e| ArbError::SchemaViolation(format!("sync_native 指令构建失败: {e}")))?;
        self.send_prepare_transaction(vec![transfer_ix, sync_ix])
            .await
    }

    /// 发送一笔准备交易（创建账户/包装），阻塞到确认
    async fn send_prepare_transaction(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<(), ArbError> {
        let blockhash = self.rpc_client.get_latest_blockhash()?;
        let mut transaction =
            Transaction::new_with_payer(&instructions, Some(&self.payer.pubkey()));
        transaction.sign(&[self.payer.as_ref()], blockhash);

        let signature = self
            .rpc_client
            .send_and_confirm_transaction(&transaction)
            .map_err(ArbError::from_client_error)?;
        debug!("准备交易已确认: {}", signature);
        Ok(())
    }
}

/// 资助决策：仅当余额严格低于阈值时返回要请求的数量（即阈值本身）
fn funding_shortfall(current: u64, minimum: u64) -> Option<u64> {
    if current < minimum {
        Some(minimum)
    } else {
        None
    }
}
