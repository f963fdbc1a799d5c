use serde_json::Value;

use super::primitives::account;
use super::primitives::at;
use super::primitives::balance;
use super::primitives::field;
use super::primitives::multi_address;
use super::ShapeError;
use super::Version;
use super::Versioned;
use crate::core::ss58::AddressCodec;
use crate::core::types::AccountId;
use crate::core::types::Balance;

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Balance,
}

/// Any balance event concerning a single account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountAmount {
    pub account: AccountId,
    pub amount: Balance,
}

/// Args of transfer calls.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCall {
    pub dest: AccountId,
    pub value: Balance,
}

pub static TRANSFER: Versioned<Transfer> = Versioned {
    name: "Balances.Transfer",
    versions: &[
        Version {
            fingerprint: "0x7a675755adc5431208bb4a3e2aa0fa34cd0bee63dcfe7b50b246229afa57e6be",
            decode: transfer_v1,
        },
        Version {
            fingerprint: "0x4c988b52bed1401823db11e1f4fa58ee94d9b506a0b2bec61ef33ac4996991dd",
            decode: transfer_v2,
        },
    ],
};

pub static ENDOWED: Versioned<AccountAmount> = Versioned {
    name: "Balances.Endowed",
    versions: &[
        Version {
            fingerprint: "0x792bbc7b5b3edc446052d04495aabe04e939bae17d11bec5f3120b61038ee2e9",
            decode: account_amount_v1,
        },
        Version {
            fingerprint: "0xa3648d99feba02ff7bb2d4af98c20c7ad99c10a2219630e7fc3292c0d3771452",
            decode: endowed_v2,
        },
    ],
};

// Deposit, Withdraw, Reserved and Unreserved share a shape.
const WHO_AMOUNT: &[Version<AccountAmount>] = &[
    Version {
        fingerprint: "0x792bbc7b5b3edc446052d04495aabe04e939bae17d11bec5f3120b61038ee2e9",
        decode: account_amount_v1,
    },
    Version {
        fingerprint: "0xacffe91d7288337838b97643040d8495924267dd0a913fb59fda5e3b7341a2bc",
        decode: who_amount_v2,
    },
];

pub static DEPOSIT: Versioned<AccountAmount> = Versioned {
    name: "Balances.Deposit",
    versions: WHO_AMOUNT,
};

pub static WITHDRAW: Versioned<AccountAmount> = Versioned {
    name: "Balances.Withdraw",
    versions: WHO_AMOUNT,
};

pub static RESERVED: Versioned<AccountAmount> = Versioned {
    name: "Balances.Reserved",
    versions: WHO_AMOUNT,
};

pub static UNRESERVED: Versioned<AccountAmount> = Versioned {
    name: "Balances.Unreserved",
    versions: WHO_AMOUNT,
};

/// Normalized to the new free balance.
pub static BALANCE_SET: Versioned<AccountAmount> = Versioned {
    name: "Balances.BalanceSet",
    versions: &[
        Version {
            fingerprint: "0xcbd2ffd063ebe709f5bec67b88a9e6e4d9654d3cc5374fcd785c74fb2638f5ba",
            decode: account_amount_v1,
        },
        Version {
            fingerprint: "0x0a709803a92b0443e91ea7344166168bc7e7fd191151b61275332e36cc09b65e",
            decode: balance_set_v2,
        },
    ],
};

pub static DUST_LOST: Versioned<AccountAmount> = Versioned {
    name: "Balances.DustLost",
    versions: &[
        Version {
            fingerprint: "0x792bbc7b5b3edc446052d04495aabe04e939bae17d11bec5f3120b61038ee2e9",
            decode: account_amount_v1,
        },
        Version {
            fingerprint: "0x144d4ae814470f2555ad85703b380ad10728c93fa87c481949ffd1b164a53a9c",
            decode: dust_lost_v2,
        },
    ],
};

// transfer and transfer_keep_alive have identical args.
const TRANSFER_CALL_VERSIONS: &[Version<TransferCall>] = &[
    Version {
        fingerprint: "0x28ca0f7812cfc44d5eb04191963b4bdf60ee37a6ced6c2184a543282bfa98d7a",
        decode: transfer_call_v1,
    },
    Version {
        fingerprint: "0xcc3c83c4b505baa026803ac197ced200a91a23f4fdcf2a24c9889b9bb739c0ad",
        decode: transfer_call_v2,
    },
];

pub static TRANSFER_CALL: Versioned<TransferCall> = Versioned {
    name: "Balances.transfer",
    versions: TRANSFER_CALL_VERSIONS,
};

pub static TRANSFER_KEEP_ALIVE_CALL: Versioned<TransferCall> = Versioned {
    name: "Balances.transfer_keep_alive",
    versions: TRANSFER_CALL_VERSIONS,
};

fn transfer_v1(raw: &Value, codec: &AddressCodec) -> Result<Transfer, ShapeError> {
    Ok(Transfer {
        from: account(at(raw, 0)?, codec)?,
        to: account(at(raw, 1)?, codec)?,
        amount: balance(at(raw, 2)?)?,
    })
}

fn transfer_v2(raw: &Value, codec: &AddressCodec) -> Result<Transfer, ShapeError> {
    Ok(Transfer {
        from: account(field(raw, "from")?, codec)?,
        to: account(field(raw, "to")?, codec)?,
        amount: balance(field(raw, "amount")?)?,
    })
}

fn account_amount_v1(raw: &Value, codec: &AddressCodec) -> Result<AccountAmount, ShapeError> {
    Ok(AccountAmount {
        account: account(at(raw, 0)?, codec)?,
        amount: balance(at(raw, 1)?)?,
    })
}

fn endowed_v2(raw: &Value, codec: &AddressCodec) -> Result<AccountAmount, ShapeError> {
    Ok(AccountAmount {
        account: account(field(raw, "account")?, codec)?,
        amount: balance(field(raw, "freeBalance")?)?,
    })
}

fn who_amount_v2(raw: &Value, codec: &AddressCodec) -> Result<AccountAmount, ShapeError> {
    Ok(AccountAmount {
        account: account(field(raw, "who")?, codec)?,
        amount: balance(field(raw, "amount")?)?,
    })
}

fn balance_set_v2(raw: &Value, codec: &AddressCodec) -> Result<AccountAmount, ShapeError> {
    Ok(AccountAmount {
        account: account(field(raw, "who")?, codec)?,
        amount: balance(field(raw, "free")?)?,
    })
}

fn dust_lost_v2(raw: &Value, codec: &AddressCodec) -> Result<AccountAmount, ShapeError> {
    Ok(AccountAmount {
        account: account(field(raw, "account")?, codec)?,
        amount: balance(field(raw, "amount")?)?,
    })
}

fn transfer_call_v1(raw: &Value, codec: &AddressCodec) -> Result<TransferCall, ShapeError> {
    Ok(TransferCall {
        dest: account(field(raw, "dest")?, codec)?,
        value: balance(field(raw, "value")?)?,
    })
}

fn transfer_call_v2(raw: &Value, codec: &AddressCodec) -> Result<TransferCall, ShapeError> {
    Ok(TransferCall {
        dest: multi_address(field(raw, "dest")?, codec)?,
        value: balance(field(raw, "value")?)?,
    })
}
