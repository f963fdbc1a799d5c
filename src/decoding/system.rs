//! Storage items.
use serde_json::Value;

use super::primitives::balance;
use super::primitives::field;
use super::ShapeError;
use super::Version;
use super::Versioned;
use crate::core::ss58::AddressCodec;
use crate::core::types::Balance;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccountBalance {
    pub free: Balance,
    pub reserved: Balance,
}

impl AccountBalance {
    pub fn total(&self) -> Balance {
        self.free.saturating_add(self.reserved)
    }
}

/// Account info, normalized to free and reserved balances.
pub static ACCOUNT: Versioned<AccountBalance> = Versioned {
    name: "System.Account",
    versions: &[
        Version {
            fingerprint: "0x45c195f99882066df4ad5971bc238555e98f3911112338e6ade39c68fc5af075",
            decode: account_v1,
        },
        Version {
            fingerprint: "0x9eb4c0a51f666ea63c494de29303d444599a05ca3947a94c44945f363d8ebff4",
            decode: account_v2,
        },
    ],
};

pub static TOTAL_ISSUANCE: Versioned<Balance> = Versioned {
    name: "Balances.TotalIssuance",
    versions: &[Version {
        fingerprint: "0x0ffb0b6f990ab6629c80fab46bf6e7514407436e0f2a8b35a6ce4d5006c42582",
        decode: total_issuance_v1,
    }],
};

// {nonce, consumers, providers, sufficients, data: {free, reserved, miscFrozen, feeFrozen}}
fn account_v1(raw: &Value, _: &AddressCodec) -> Result<AccountBalance, ShapeError> {
    let data = field(raw, "data")?;
    field(data, "miscFrozen")?;
    Ok(AccountBalance {
        free: balance(field(data, "free")?)?,
        reserved: balance(field(data, "reserved")?)?,
    })
}

// {nonce, consumers, providers, sufficients, data: {free, reserved, frozen, flags}}
fn account_v2(raw: &Value, _: &AddressCodec) -> Result<AccountBalance, ShapeError> {
    let data = field(raw, "data")?;
    field(data, "frozen")?;
    Ok(AccountBalance {
        free: balance(field(data, "free")?)?,
        reserved: balance(field(data, "reserved")?)?,
    })
}

fn total_issuance_v1(raw: &Value, _: &AddressCodec) -> Result<Balance, ShapeError> {
    balance(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Fingerprint;
    use serde_json::json;

    #[test]
    fn account_versions() {
        let codec = AddressCodec::new(42);
        let v1 = json!({"nonce": 1, "consumers": 0, "providers": 1, "sufficients": 0,
            "data": {"free": "100", "reserved": "5", "miscFrozen": "0", "feeFrozen": "0"}});
        let v2 = json!({"nonce": 1, "consumers": 0, "providers": 1, "sufficients": 0,
            "data": {"free": "100", "reserved": "5", "frozen": "0", "flags": "0"}});
        let fp0 = Fingerprint::from(ACCOUNT.fingerprint(0));
        let fp1 = Fingerprint::from(ACCOUNT.fingerprint(1));
        let b1 = ACCOUNT.decode_with(Some(&fp0), &v1, &codec).unwrap();
        let b2 = ACCOUNT.decode_with(Some(&fp1), &v2, &codec).unwrap();
        assert_eq!(b1, b2);
        assert_eq!(b1.total(), 105);
    }

    #[test]
    fn account_v2_shape_under_v1_fingerprint() {
        let codec = AddressCodec::new(42);
        let v2 = json!({"data": {"free": "1", "reserved": "0", "frozen": "0", "flags": "0"}});
        let fp0 = Fingerprint::from(ACCOUNT.fingerprint(0));
        assert!(ACCOUNT.decode_with(Some(&fp0), &v2, &codec).is_err());
    }
}
