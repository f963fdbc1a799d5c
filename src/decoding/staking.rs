use serde_json::Value;

use super::primitives::account;
use super::primitives::at;
use super::primitives::balance;
use super::primitives::evm_address;
use super::primitives::field;
use super::primitives::kind;
use super::primitives::uint32;
use super::ShapeError;
use super::Version;
use super::Versioned;
use crate::core::ss58::AddressCodec;
use crate::core::types::AccountId;
use crate::core::types::Balance;

#[derive(Debug, Clone, PartialEq)]
pub struct Reward {
    pub account: AccountId,
    pub amount: Balance,
    pub era: Option<u32>,
    /// Validator or staked contract the reward relates to.
    pub validator: Option<String>,
}

pub static REWARDED: Versioned<Reward> = Versioned {
    name: "Staking.Rewarded",
    versions: &[
        Version {
            fingerprint: "0x93b28cd1fefb562587db3b425088f0f3387cab1a9bab391f7d3859ac1a7ccc0f",
            decode: rewarded_v1,
        },
        Version {
            fingerprint: "0x98d50a896ef902522cc33acb93266ea60527e7ab78f5a7e9351ffea972311c69",
            decode: rewarded_v2,
        },
    ],
};

pub static DAPPS_REWARD: Versioned<Reward> = Versioned {
    name: "DappsStaking.Reward",
    versions: &[
        Version {
            fingerprint: "0xab8495eb7dffe0abf2ccb7facb18b201074a422cc8e3ab66e39f954235bd371d",
            decode: dapps_reward_v1,
        },
        Version {
            fingerprint: "0xa39d1e2dedbf6d8c3893799e49b1346bed02d99fd29063a05e44ec316a1115b8",
            decode: dapps_reward_v2,
        },
    ],
};

fn rewarded_v1(raw: &Value, codec: &AddressCodec) -> Result<Reward, ShapeError> {
    Ok(Reward {
        account: account(at(raw, 0)?, codec)?,
        amount: balance(at(raw, 1)?)?,
        era: None,
        validator: None,
    })
}

fn rewarded_v2(raw: &Value, codec: &AddressCodec) -> Result<Reward, ShapeError> {
    Ok(Reward {
        account: account(field(raw, "stash")?, codec)?,
        amount: balance(field(raw, "amount")?)?,
        era: None,
        validator: None,
    })
}

fn dapps_reward_v1(raw: &Value, codec: &AddressCodec) -> Result<Reward, ShapeError> {
    Ok(Reward {
        account: account(at(raw, 0)?, codec)?,
        validator: Some(smart_contract(at(raw, 1)?, codec)?),
        era: Some(uint32(at(raw, 2)?)?),
        amount: balance(at(raw, 3)?)?,
    })
}

fn dapps_reward_v2(raw: &Value, codec: &AddressCodec) -> Result<Reward, ShapeError> {
    Ok(Reward {
        account: account(field(raw, "staker")?, codec)?,
        validator: Some(smart_contract(field(raw, "smartContract")?, codec)?),
        era: Some(uint32(field(raw, "era")?)?),
        amount: balance(field(raw, "amount")?)?,
    })
}

/// Staked contract, EVM or Wasm.
fn smart_contract(v: &Value, codec: &AddressCodec) -> Result<String, ShapeError> {
    let value = field(v, "value")?;
    match kind(v)? {
        "Evm" => evm_address(value),
        "Wasm" => account(value, codec),
        other => Err(ShapeError::Malformed(format!(
            "unknown smart contract kind `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Fingerprint;
    use serde_json::json;

    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const CONTRACT: &str = "0x6be02d1d3665660d22ff9624b7be0551ee1ac91b";

    #[test]
    fn rewarded_versions() {
        let codec = AddressCodec::new(42);
        let v1 = json!([ALICE_HEX, "12"]);
        let v2 = json!({"stash": ALICE_HEX, "dest": {"__kind": "Staked"}, "amount": "12"});
        let fp0 = Fingerprint::from(REWARDED.fingerprint(0));
        let fp1 = Fingerprint::from(REWARDED.fingerprint(1));
        let r1 = REWARDED.decode_with(Some(&fp0), &v1, &codec).unwrap();
        let r2 = REWARDED.decode_with(Some(&fp1), &v2, &codec).unwrap();
        assert_eq!(r1, r2);
        assert_eq!(r1.account, ALICE);
        assert_eq!(r1.amount, 12);
    }

    #[test]
    fn dapps_reward_carries_era_and_contract() {
        let codec = AddressCodec::new(42);
        let v1 = json!([
            ALICE_HEX,
            {"__kind": "Evm", "value": "0x6BE02D1D3665660D22FF9624B7BE0551EE1AC91B"},
            1203,
            "999"
        ]);
        let fp = Fingerprint::from(DAPPS_REWARD.fingerprint(0));
        let reward = DAPPS_REWARD.decode_with(Some(&fp), &v1, &codec).unwrap();
        assert_eq!(
            reward,
            Reward {
                account: ALICE.to_owned(),
                amount: 999,
                era: Some(1203),
                validator: Some(CONTRACT.to_owned()),
            }
        );
    }
}
