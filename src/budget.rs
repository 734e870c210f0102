use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;

/// 在指令序列前端注入 Compute Budget 指令
///
/// 注入顺序是 limit 在先、price 在后，后注入的更靠前：
/// 两个参数都给时最终顺序为 price、limit、原始指令；
/// 只给一个时该条指令在最前；都不给时原样返回。
/// 原始指令之间的相对顺序永远不变。
pub fn inject_compute_budget(
    mut instructions: Vec<Instruction>,
    unit_limit: Option<u32>,
    unit_price: Option<u64>,
) -> Vec<Instruction> {
    if let Some(limit) = unit_limit {
        instructions.insert(0, ComputeBudgetInstruction::set_compute_unit_limit(limit));
    }
    if let Some(price) = unit_price {
        instructions.insert(0, ComputeBudgetInstruction::set_compute_unit_price(price));
    }
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use solana_sdk::instruction::AccountMeta;
    use solana_sdk::pubkey::Pubkey;

    // ComputeBudgetInstruction 的 Borsh 判别字节
    const SET_COMPUTE_UNIT_LIMIT: u8 = 2;
    const SET_COMPUTE_UNIT_PRICE: u8 = 3;

    fn payload_ix() -> Instruction {
        Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![AccountMeta::new(Pubkey::new_unique(), false)],
            data: vec![0xAA, 1, 2, 3],
        }
    }

    #[test]
    fn both_params_give_price_then_limit_then_payload() {
        let payload = payload_ix();
        let out = inject_compute_budget(vec![payload.clone()], Some(400_000), Some(10_000));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].data[0], SET_COMPUTE_UNIT_PRICE);
        assert_eq!(out[1].data[0], SET_COMPUTE_UNIT_LIMIT);
        assert_eq!(out[2], payload);
        // 两条预算指令都指向同一个程序，且不是负载的程序
        assert_eq!(out[0].program_id, out[1].program_id);
        assert_ne!(out[0].program_id, payload.program_id);
    }

    #[test]
    fn limit_only_precedes_payload() {
        let payload = payload_ix();
        let out = inject_compute_budget(vec![payload.clone()], Some(400_000), None);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].data[0], SET_COMPUTE_UNIT_LIMIT);
        assert_eq!(out[1], payload);
    }

    #[test]
    fn price_only_precedes_payload() {
        let payload = payload_ix();
        let out = inject_compute_budget(vec![payload.clone()], None, Some(10_000));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].data[0], SET_COMPUTE_UNIT_PRICE);
        assert_eq!(out[1], payload);
    }

    #[test]
    fn no_params_pass_through_unchanged() {
        let payload = payload_ix();
        let out = inject_compute_budget(vec![payload.clone()], None, None);
        assert_eq!(out, vec![payload]);
    }

    #[test]
    fn payload_order_is_preserved() {
        let first = payload_ix();
        let second = payload_ix();
        let out = inject_compute_budget(
            vec![first.clone(), second.clone()],
            Some(400_000),
            Some(10_000),
        );
        assert_eq!(out[2], first);
        assert_eq!(out[3], second);
    }
}
