use serde_json::Value;

use super::primitives::account;
use super::primitives::at;
use super::primitives::field;
use super::primitives::identity_data;
use super::primitives::kind;
use super::primitives::multi_address;
use super::ShapeError;
use super::Version;
use super::Versioned;
use crate::core::ss58::AddressCodec;
use crate::core::types::AccountId;
use crate::core::types::Judgement;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityInfo {
    pub display: Option<String>,
    pub legal: Option<String>,
    pub web: Option<String>,
    /// Matrix handle (formerly riot).
    pub matrix: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubLink {
    pub sub: AccountId,
    pub main: AccountId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubEntry {
    pub sub: AccountId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgementCall {
    pub target: AccountId,
    pub judgement: Judgement,
}

pub static IDENTITY_SET: Versioned<AccountId> = Versioned {
    name: "Identity.IdentitySet",
    versions: &[
        Version {
            fingerprint: "0x860f792145432e709e4fad41616ec63b45fb4b424748c7940c858d188b1f7584",
            decode: first_account,
        },
        Version {
            fingerprint: "0x83e74e3caf0540ce00aede756a4896793447ece9f03a4e5335381104e0a4e567",
            decode: who,
        },
    ],
};

// Cleared and killed both carry (who, deposit).
const WHO_DEPOSIT: &[Version<AccountId>] = &[
    Version {
        fingerprint: "0x9d970fb40fa212170bbd2d1538bb058f2f738ca6ea219fecfd90d21debf81b01",
        decode: first_account,
    },
    Version {
        fingerprint: "0xeafddcf05b967e41fdcdfbdea87a29fabcdafdf5f6bb4af7f8d2f31185ad690e",
        decode: who,
    },
];

pub static IDENTITY_CLEARED: Versioned<AccountId> = Versioned {
    name: "Identity.IdentityCleared",
    versions: WHO_DEPOSIT,
};

pub static IDENTITY_KILLED: Versioned<AccountId> = Versioned {
    name: "Identity.IdentityKilled",
    versions: WHO_DEPOSIT,
};

pub static JUDGEMENT_GIVEN: Versioned<AccountId> = Versioned {
    name: "Identity.JudgementGiven",
    versions: &[
        Version {
            fingerprint: "0xc670d15e1966a32bd1ffe4f91e6576af5a4b8f4cd14517076acbd42f357e2b2c",
            decode: first_account,
        },
        Version {
            fingerprint: "0x5206a3b81713dcfa3f35e98f8bcedc58eda8e4a0fa57304b7460d9f1dd4fda42",
            decode: target,
        },
    ],
};

const SUB_LINK: &[Version<SubLink>] = &[
    Version {
        fingerprint: "0xb39f8c14cc8489f6e7b7bd7f3b83839dd62c4093d1c3b442fb81bbdf072104b6",
        decode: sub_link_v1,
    },
    Version {
        fingerprint: "0x32292831b5d49a3ef2a958dae599f85563b753616265064cab03da6d4166a5f7",
        decode: sub_link_v2,
    },
];

pub static SUB_IDENTITY_ADDED: Versioned<SubLink> = Versioned {
    name: "Identity.SubIdentityAdded",
    versions: SUB_LINK,
};

pub static SUB_IDENTITY_REMOVED: Versioned<SubLink> = Versioned {
    name: "Identity.SubIdentityRemoved",
    versions: SUB_LINK,
};

pub static SUB_IDENTITY_REVOKED: Versioned<SubLink> = Versioned {
    name: "Identity.SubIdentityRevoked",
    versions: SUB_LINK,
};

pub static SET_IDENTITY_CALL: Versioned<IdentityInfo> = Versioned {
    name: "Identity.set_identity",
    versions: &[
        Version {
            fingerprint: "0x2c2341957402ccb1999cb08184a2647653e6d9a93b683904b7d656ffcca3f97b",
            decode: set_identity_v1,
        },
        Version {
            fingerprint: "0x97fa22d38e84a6f4114a103179637f1d92cf77a44161bbde0b07763c6ee70493",
            decode: set_identity_v2,
        },
    ],
};

pub static SET_SUBS_CALL: Versioned<Vec<SubEntry>> = Versioned {
    name: "Identity.set_subs",
    versions: &[Version {
        fingerprint: "0xd8baa59ebd68bdf6f8cacae6a685b017d9544dcda270cd4a36d40aac4eeacebc",
        decode: set_subs_v1,
    }],
};

// add_sub and rename_sub both carry (sub, data).
const SUB_DATA: &[Version<SubEntry>] = &[
    Version {
        fingerprint: "0x1428b45752badea3a9b7e5fe3e4494628a4144b4951eadce0aec5abddfea8eff",
        decode: sub_data_v1,
    },
    Version {
        fingerprint: "0xace22efb2e728eced0608dd48ed3ca886ae98ec1ec9f311d79e0f38c76810c0d",
        decode: sub_data_v2,
    },
];

pub static ADD_SUB_CALL: Versioned<SubEntry> = Versioned {
    name: "Identity.add_sub",
    versions: SUB_DATA,
};

pub static RENAME_SUB_CALL: Versioned<SubEntry> = Versioned {
    name: "Identity.rename_sub",
    versions: SUB_DATA,
};

pub static PROVIDE_JUDGEMENT_CALL: Versioned<JudgementCall> = Versioned {
    name: "Identity.provide_judgement",
    versions: &[
        Version {
            fingerprint: "0xbb224abae7f094dffa0e461f9d3a67cc891cb852605fd94d655e5636fac04048",
            decode: provide_judgement_v1,
        },
        Version {
            fingerprint: "0xe03e1be625a0cc93da706635874cb8feff6b09fce2a9df7024bdca9af3901541",
            decode: provide_judgement_v2,
        },
    ],
};

fn first_account(raw: &Value, codec: &AddressCodec) -> Result<AccountId, ShapeError> {
    account(at(raw, 0)?, codec)
}

fn who(raw: &Value, codec: &AddressCodec) -> Result<AccountId, ShapeError> {
    account(field(raw, "who")?, codec)
}

fn target(raw: &Value, codec: &AddressCodec) -> Result<AccountId, ShapeError> {
    account(field(raw, "target")?, codec)
}

fn sub_link_v1(raw: &Value, codec: &AddressCodec) -> Result<SubLink, ShapeError> {
    Ok(SubLink {
        sub: account(at(raw, 0)?, codec)?,
        main: account(at(raw, 1)?, codec)?,
    })
}

fn sub_link_v2(raw: &Value, codec: &AddressCodec) -> Result<SubLink, ShapeError> {
    Ok(SubLink {
        sub: account(field(raw, "sub")?, codec)?,
        main: account(field(raw, "main")?, codec)?,
    })
}

fn set_identity_v1(raw: &Value, _: &AddressCodec) -> Result<IdentityInfo, ShapeError> {
    let info = field(raw, "info")?;
    Ok(IdentityInfo {
        display: identity_data(field(info, "display")?)?,
        legal: identity_data(field(info, "legal")?)?,
        web: identity_data(field(info, "web")?)?,
        matrix: identity_data(field(info, "riot")?)?,
        email: identity_data(field(info, "email")?)?,
        twitter: identity_data(field(info, "twitter")?)?,
        image: identity_data(field(info, "image")?)?,
    })
}

fn set_identity_v2(raw: &Value, _: &AddressCodec) -> Result<IdentityInfo, ShapeError> {
    let info = field(raw, "info")?;
    Ok(IdentityInfo {
        display: identity_data(field(info, "display")?)?,
        legal: identity_data(field(info, "legal")?)?,
        web: identity_data(field(info, "web")?)?,
        matrix: identity_data(field(info, "matrix")?)?,
        email: identity_data(field(info, "email")?)?,
        twitter: identity_data(field(info, "twitter")?)?,
        image: identity_data(field(info, "image")?)?,
    })
}

fn set_subs_v1(raw: &Value, codec: &AddressCodec) -> Result<Vec<SubEntry>, ShapeError> {
    field(raw, "subs")?
        .as_array()
        .ok_or_else(|| ShapeError::Malformed("subs is not a list".to_owned()))?
        .iter()
        .map(|entry| {
            Ok(SubEntry {
                sub: account(at(entry, 0)?, codec)?,
                name: identity_data(at(entry, 1)?)?,
            })
        })
        .collect()
}

fn sub_data_v1(raw: &Value, codec: &AddressCodec) -> Result<SubEntry, ShapeError> {
    Ok(SubEntry {
        sub: account(field(raw, "sub")?, codec)?,
        name: identity_data(field(raw, "data")?)?,
    })
}

fn sub_data_v2(raw: &Value, codec: &AddressCodec) -> Result<SubEntry, ShapeError> {
    Ok(SubEntry {
        sub: multi_address(field(raw, "sub")?, codec)?,
        name: identity_data(field(raw, "data")?)?,
    })
}

fn provide_judgement_v1(raw: &Value, codec: &AddressCodec) -> Result<JudgementCall, ShapeError> {
    Ok(JudgementCall {
        target: account(field(raw, "target")?, codec)?,
        judgement: judgement(field(raw, "judgement")?)?,
    })
}

fn provide_judgement_v2(raw: &Value, codec: &AddressCodec) -> Result<JudgementCall, ShapeError> {
    Ok(JudgementCall {
        target: multi_address(field(raw, "target")?, codec)?,
        judgement: judgement(field(raw, "judgement")?)?,
    })
}

fn judgement(v: &Value) -> Result<Judgement, ShapeError> {
    match kind(v)? {
        "Unknown" => Ok(Judgement::Unknown),
        "FeePaid" => Ok(Judgement::FeePaid),
        "Reasonable" => Ok(Judgement::Reasonable),
        "KnownGood" => Ok(Judgement::KnownGood),
        "OutOfDate" => Ok(Judgement::OutOfDate),
        "LowQuality" => Ok(Judgement::LowQuality),
        "Erroneous" => Ok(Judgement::Erroneous),
        other => Err(ShapeError::Malformed(format!("unknown judgement `{other}`"))),
    }
}
