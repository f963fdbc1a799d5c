use postgres_from_row::FromRow;

use crate::core::types::AccountId;
use crate::core::types::Amount;
use crate::core::types::AssetKind;
use crate::core::types::Balance;
use crate::core::types::BlockHash;
use crate::core::types::ContractType;
use crate::core::types::EvmAddress;
use crate::core::types::ExtrinsicHash;
use crate::core::types::Height;
use crate::core::types::Judgement;
use crate::core::types::Timestamp;
use crate::decoding::identity::IdentityInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub evm_address: Option<EvmAddress>,
    pub free: Balance,
    pub reserved: Balance,
    pub total: Balance,
    /// Height of last change.
    pub updated_at: Height,
}

impl AccountRecord {
    /// New account with zero balances.
    pub fn new(id: &str, height: Height) -> Self {
        Self {
            id: id.to_owned(),
            evm_address: None,
            free: 0,
            reserved: 0,
            total: 0,
            updated_at: height,
        }
    }

    pub fn with_balance(id: &str, free: Balance, reserved: Balance, height: Height) -> Self {
        Self {
            id: id.to_owned(),
            evm_address: None,
            free,
            reserved,
            total: free.saturating_add(reserved),
            updated_at: height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    /// Id of originating event (or call, for failed transfers).
    pub id: String,
    pub block_hash: BlockHash,
    pub height: Height,
    pub timestamp: Timestamp,
    pub extrinsic_hash: Option<ExtrinsicHash>,
    pub from_id: AccountId,
    pub to_id: AccountId,
    pub amount: Amount,
    pub success: bool,
    pub asset: AssetKind,
    /// Token contract, for non-native transfers.
    pub contract: Option<EvmAddress>,
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StakingRewardRecord {
    pub id: String,
    pub block_hash: BlockHash,
    pub height: Height,
    pub timestamp: Timestamp,
    pub extrinsic_hash: Option<ExtrinsicHash>,
    pub account_id: AccountId,
    pub amount: Balance,
    pub era: Option<i64>,
    pub validator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct IdentityRecord {
    pub id: AccountId,
    pub display: Option<String>,
    pub legal: Option<String>,
    pub web: Option<String>,
    pub matrix: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub image: Option<String>,
    pub judgement: Judgement,
    pub is_killed: bool,
    pub created_at: Height,
    pub updated_at: Height,
}

impl IdentityRecord {
    pub fn new(id: &str, height: Height) -> Self {
        Self {
            id: id.to_owned(),
            display: None,
            legal: None,
            web: None,
            matrix: None,
            email: None,
            twitter: None,
            image: None,
            judgement: Judgement::Unknown,
            is_killed: false,
            created_at: height,
            updated_at: height,
        }
    }

    pub fn set_info(&mut self, info: &IdentityInfo) {
        self.display = info.display.clone();
        self.legal = info.legal.clone();
        self.web = info.web.clone();
        self.matrix = info.matrix.clone();
        self.email = info.email.clone();
        self.twitter = info.twitter.clone();
        self.image = info.image.clone();
    }

    /// Drops all info and judgements.
    pub fn clear(&mut self) {
        self.set_info(&IdentityInfo::default());
        self.judgement = Judgement::Unknown;
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct IdentitySubRecord {
    pub id: AccountId,
    /// Identity this sub belongs to.
    pub super_id: Option<AccountId>,
    pub name: Option<String>,
    pub updated_at: Height,
}

impl IdentitySubRecord {
    pub fn new(id: &str, height: Height) -> Self {
        Self {
            id: id.to_owned(),
            super_id: None,
            name: None,
            updated_at: height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvmContractRecord {
    pub id: EvmAddress,
    pub extrinsic_hash: Option<ExtrinsicHash>,
    pub transaction_hash: String,
    pub deployer_id: AccountId,
    pub height: Height,
    pub timestamp: Timestamp,
    pub bytecode: Vec<u8>,
    /// Creation code up to and including the metadata hash.
    pub bytecode_context: Vec<u8>,
    /// Appended constructor arguments.
    pub bytecode_arguments: Vec<u8>,
    pub contract_type: ContractType,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<i16>,
    /// Metadata uri of token 0, for NFT contracts.
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainStateRecord {
    pub block_hash: BlockHash,
    pub height: Height,
    /// Start of the day-bucket the snapshot belongs to.
    pub timestamp: Timestamp,
    pub total_issuance: Balance,
    pub holders: i64,
}
