//! SS58 address encoding and EVM address mapping.
use base58::FromBase58;
use base58::ToBase58;
use blake2::digest::consts::U32;
use blake2::Blake2b;
use blake2::Blake2b512;
use blake2::Digest;
use thiserror::Error;

use super::types::AccountId;

type Blake2b256 = Blake2b<U32>;

const SS58_PREFIX: &[u8] = b"SS58PRE";
const EVM_PREFIX: &[u8] = b"evm:";

#[derive(Error, Debug, PartialEq)]
pub enum AddressError {
    #[error("invalid hex in address `{0}`")]
    InvalidHex(String),
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid ss58 address `{0}`")]
    InvalidSS58(String),
}

/// Converts raw public keys to SS58 account ids for a given network prefix.
#[derive(Debug, Clone, Copy)]
pub struct AddressCodec {
    prefix: u16,
}

impl AddressCodec {
    pub fn new(prefix: u16) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    /// Encode a 32-byte public key.
    pub fn encode(&self, public_key: &[u8; 32]) -> AccountId {
        let mut payload = self.prefix_bytes();
        payload.extend_from_slice(public_key);
        let hash = checksum(&payload);
        payload.extend_from_slice(&hash[..2]);
        payload.to_base58()
    }

    /// Encode a hex encoded (`0x` optional) 32-byte public key.
    pub fn encode_hex(&self, public_key: &str) -> Result<AccountId, AddressError> {
        let bytes = decode_hex_fixed::<32>(public_key)?;
        Ok(self.encode(&bytes))
    }

    /// Recover the public key of an SS58 account id.
    pub fn decode(&self, account: &str) -> Result<[u8; 32], AddressError> {
        let bytes = account
            .from_base58()
            .map_err(|_| AddressError::InvalidSS58(account.to_owned()))?;
        let prefix_len = self.prefix_bytes().len();
        if bytes.len() != prefix_len + 32 + 2 {
            return Err(AddressError::InvalidSS58(account.to_owned()));
        }
        let (body, check) = bytes.split_at(prefix_len + 32);
        if body[..prefix_len] != self.prefix_bytes()[..] || checksum(body)[..2] != check[..] {
            return Err(AddressError::InvalidSS58(account.to_owned()));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&body[prefix_len..]);
        Ok(key)
    }

    /// Account id a H160 address maps to (hashed address mapping).
    pub fn evm_account(&self, evm_address: &str) -> Result<AccountId, AddressError> {
        let h160 = decode_hex_fixed::<20>(evm_address)?;
        let mut hasher = Blake2b256::new();
        hasher.update(EVM_PREFIX);
        hasher.update(h160);
        let key: [u8; 32] = hasher.finalize().into();
        Ok(self.encode(&key))
    }

    fn prefix_bytes(&self) -> Vec<u8> {
        let p = self.prefix;
        match p {
            0..=63 => vec![p as u8],
            _ => vec![
                (((p & 0b0000_0000_1111_1100) as u8) >> 2) | 0b0100_0000,
                ((p >> 8) as u8) | (((p & 0b0000_0000_0000_0011) as u8) << 6),
            ],
        }
    }
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX);
    hasher.update(payload);
    hasher.finalize().to_vec()
}

/// Decode hex string (`0x` optional) into exactly `N` bytes.
pub fn decode_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], AddressError> {
    let bytes = decode_hex(s)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| AddressError::InvalidLength {
        expected: N,
        actual,
    })
}

/// Decode hex string, with or without `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, AddressError> {
    hex::decode(s.trim_start_matches("0x")).map_err(|_| AddressError::InvalidHex(s.to_owned()))
}

/// Normalizes a H160 address to lowercase `0x` form.
pub fn normalize_evm_address(s: &str) -> Result<String, AddressError> {
    let bytes = decode_hex_fixed::<20>(s)?;
    Ok(format!("0x{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known dev account (Alice)
    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";
    const ALICE_42: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[test]
    fn encodes_generic_substrate_address() {
        let codec = AddressCodec::new(42);
        assert_eq!(codec.encode_hex(ALICE_HEX).unwrap(), ALICE_42);
    }

    #[test]
    fn decode_recovers_public_key() {
        let codec = AddressCodec::new(42);
        let key = codec.decode(ALICE_42).unwrap();
        assert_eq!(format!("0x{}", hex::encode(key)), ALICE_HEX);
    }

    #[test]
    fn decode_rejects_other_prefix() {
        let astar = AddressCodec::new(5);
        assert!(astar.decode(ALICE_42).is_err());
    }

    #[test]
    fn two_byte_prefix_roundtrip() {
        let codec = AddressCodec::new(1284);
        let key = decode_hex_fixed::<32>(ALICE_HEX).unwrap();
        let encoded = codec.encode(&key);
        assert_eq!(codec.decode(&encoded).unwrap(), key);
    }

    #[test]
    fn evm_mapping_is_deterministic() {
        let codec = AddressCodec::new(5);
        let a = codec
            .evm_account("0x6Be02d1d3665660d22FF9624b7BE0551ee1Ac91b")
            .unwrap();
        let b = codec
            .evm_account("0x6be02d1d3665660d22ff9624b7be0551ee1ac91b")
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_short_keys() {
        let codec = AddressCodec::new(42);
        assert_eq!(
            codec.encode_hex("0x1234"),
            Err(AddressError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
    }
}
