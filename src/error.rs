use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

/// 流水线错误分类
///
/// 编排器按错误种类匹配处理，而不是靠异常类型判断。
/// 只有 AccountMissing / InsufficientFunds 在流水线内部恢复，
/// 其余全部携带原始诊断信息冒泡给调用方。
#[derive(Debug, Error)]
pub enum ArbError {
    /// 账户不存在且创建失败（正常路径下由创建 ATA 就地恢复）
    #[error("account missing: {0}")]
    AccountMissing(Pubkey),

    /// 余额不足且无法补足（dev/test 网络通过空投恢复，生产环境致命）
    #[error("insufficient funds for {owner}: required {required} lamports, current {current}")]
    InsufficientFunds {
        owner: Pubkey,
        required: u64,
        current: u64,
    },

    /// 账户表或参数不符合指令 schema。调用方 bug，不重试
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// 模拟或链上执行失败，detail/logs 为远端返回的原始诊断
    #[error("simulation or execution failure: {detail}")]
    SimulationOrExecutionFailure { detail: String, logs: Vec<String> },

    /// 确认超时。非终态：交易之后仍可能落地，
    /// 调用方可以稍后用签名查询，但不能盲目重发
    #[error("transaction {signature} unconfirmed after {waited_secs}s")]
    Unconfirmed {
        signature: Signature,
        waited_secs: u64,
    },

    /// 确认路径之外的 RPC 传输错误
    #[error("rpc transport error: {0}")]
    Network(#[from] ClientError),
}

impl ArbError {
    /// 把发送路径的 RPC 错误归类：预检模拟失败和交易错误
    /// 归为执行失败并保留程序日志，其余视为传输错误。
    pub fn from_client_error(err: ClientError) -> Self {
        match &*err.kind {
            ClientErrorKind::RpcError(RpcError::RpcResponseError {
                message,
                data: RpcResponseErrorData::SendTransactionPreflightFailure(simulation),
                ..
            }) => ArbError::SimulationOrExecutionFailure {
                detail: message.clone(),
                logs: simulation.logs.clone().unwrap_or_default(),
            },
            ClientErrorKind::TransactionError(tx_err) => ArbError::SimulationOrExecutionFailure {
                detail: tx_err.to_string(),
                logs: Vec::new(),
            },
            _ => ArbError::Network(err),
        }
    }

    /// 是否属于流水线内部可恢复的种类
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ArbError::AccountMissing(_) | ArbError::InsufficientFunds { .. }
        )
    }
}
