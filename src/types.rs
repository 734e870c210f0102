use borsh::BorshSerialize;
use serde::Deserialize;

/// 链上套利程序支持的 DEX 场所
///
/// 闭合枚举：新增场所需要加变体和对应的账户 schema，
/// 标签值与链上程序的 dispatch 表一致，不能改动已有值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportDex {
    PumpAmm,
    Dlmm,
}

impl SupportDex {
    /// 链上 ArbitrageIxData.dex 的标签值
    pub fn tag(&self) -> u8 {
        match self {
            SupportDex::PumpAmm => 0,
            SupportDex::Dlmm => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SupportDex::PumpAmm => "pump_amm",
            SupportDex::Dlmm => "dlmm",
        }
    }
}

/// 套利指令参数，Borsh 序列化后逐字节对应链上程序的数据布局
/// （dex 标签 1 字节 + 两个小端 u64 + no_failure 1 字节，共 18 字节）
///
/// no_failure = true 时链上程序整笔交易回滚，不做部分执行。
#[derive(Debug, Clone, Copy, PartialEq, BorshSerialize)]
pub struct ArbitrageIxData {
    pub dex: SupportDex,
    pub max_bin_to_process: u64,
    pub min_profit_threshold: u64,
    pub no_failure: bool,
}

/// 流水线状态机
///
/// Idle → AccountsResolving → BalanceChecking → Encoding →
/// BudgetInjecting → Submitting → Confirmed | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    AccountsResolving,
    BalanceChecking,
    Encoding,
    BudgetInjecting,
    Submitting,
    Confirmed,
    Failed,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "Idle",
            PipelineStage::AccountsResolving => "AccountsResolving",
            PipelineStage::BalanceChecking => "BalanceChecking",
            PipelineStage::Encoding => "Encoding",
            PipelineStage::BudgetInjecting => "BudgetInjecting",
            PipelineStage::Submitting => "Submitting",
            PipelineStage::Confirmed => "Confirmed",
            PipelineStage::Failed => "Failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn support_dex_tags() {
        assert_eq!(SupportDex::PumpAmm.tag(), 0);
        assert_eq!(SupportDex::Dlmm.tag(), 1);
    }

    #[test]
    fn arbitrage_ix_data_borsh_layout() {
        let args = ArbitrageIxData {
            dex: SupportDex::Dlmm,
            max_bin_to_process: 20,
            min_profit_threshold: 10,
            no_failure: true,
        };
        let bytes = borsh::to_vec(&args).unwrap();
        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[0], 1); // dex 标签
        assert_eq!(u64::from_le_bytes(bytes[1..9].try_into().unwrap()), 20);
        assert_eq!(u64::from_le_bytes(bytes[9..17].try_into().unwrap()), 10);
        assert_eq!(bytes[17], 1); // no_failure
    }

    #[test]
    fn borsh_enum_tag_matches_manual_tag() {
        for dex in [SupportDex::PumpAmm, SupportDex::Dlmm] {
            let bytes = borsh::to_vec(&dex).unwrap();
            assert_eq!(bytes, vec![dex.tag()]);
        }
    }
}
