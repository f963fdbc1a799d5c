use crate::core::types::Timestamp;

/// Length of a day-bucket, in ms.
pub const DAY_MS: Timestamp = 86_400_000;

pub const DEFAULT_BATCH_SIZE: i32 = 100;
pub const DEFAULT_TOKEN_CALL_TIMEOUT_MS: u64 = 2_000;

/// Time to wait for new blocks once caught up, in ms.
pub const POLL_INTERVAL_MS: u64 = 6_000;

pub mod evm {
    /// `PUSH1 0x80 PUSH1 0x40`, opening solidity creation code.
    pub const CREATION_PROLOGUE: &[u8] = &[0x60, 0x80, 0x60, 0x40];

    /// keccak256 of `Transfer(address,address,uint256)`
    pub const TRANSFER_TOPIC: &str =
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
}
