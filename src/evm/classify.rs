//! Contract classification from method selectors found in bytecode.
use alloy_primitives::keccak256;
use std::sync::OnceLock;

use super::bytecode::find;
use crate::core::types::ContractType;

/// Standards a contract can be recognized as, first match wins.
const STANDARDS: [(ContractType, &[&str]); 3] = [
    (
        ContractType::Erc20,
        &[
            "totalSupply()",
            "balanceOf(address)",
            "allowance(address,address)",
            "transfer(address,uint256)",
            "approve(address,uint256)",
            "transferFrom(address,address,uint256)",
        ],
    ),
    (
        ContractType::Erc721,
        &[
            "balanceOf(address)",
            "ownerOf(uint256)",
            "safeTransferFrom(address,address,uint256)",
            "transferFrom(address,address,uint256)",
            "approve(address,uint256)",
            "setApprovalForAll(address,bool)",
            "getApproved(uint256)",
            "isApprovedForAll(address,address)",
        ],
    ),
    (
        ContractType::Erc1155,
        &[
            "balanceOf(address,uint256)",
            "balanceOfBatch(address[],uint256[])",
            "setApprovalForAll(address,bool)",
            "isApprovedForAll(address,address)",
            "safeTransferFrom(address,address,uint256,uint256,bytes)",
            "safeBatchTransferFrom(address,address,uint256[],uint256[],bytes)",
        ],
    ),
];

const NAME: &str = "name()";
const SYMBOL: &str = "symbol()";

type Selector = [u8; 4];

struct Table {
    standards: Vec<(ContractType, Vec<Selector>)>,
    name: Selector,
    symbol: Selector,
}

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| Table {
        standards: STANDARDS
            .iter()
            .map(|(ct, signatures)| (*ct, signatures.iter().map(|s| selector(s)).collect()))
            .collect(),
        name: selector(NAME),
        symbol: selector(SYMBOL),
    })
}

/// First 4 bytes of the keccak256 hash of a method signature.
pub fn selector(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Classifies contract from its creation code.
pub fn classify(input: &[u8]) -> ContractType {
    let table = table();
    let has = |sel: &Selector| find(input, sel).is_some();
    for (contract_type, selectors) in &table.standards {
        if selectors.iter().all(has) {
            return *contract_type;
        }
    }
    match (has(&table.name), has(&table.symbol)) {
        (true, true) => ContractType::Basic,
        (true, false) => ContractType::Bare,
        _ => ContractType::Unknown,
    }
}
