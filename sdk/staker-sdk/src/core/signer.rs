use crate::error::{Result, StakerSdkError};
use libsecp256k1::curve::Scalar;
use libsecp256k1::{PublicKey, SecretKey, ECMULT_GEN_CONTEXT};
use ripemd::Ripemd160;
use sha2::digest::consts::U32;
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256};
use std::fmt;

/// secp256k1 group order
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Abstraction for an entity that can authorize transactions.
/// This allows the SDK to work with:
/// 1. Local private keys (CLI)
/// 2. Remote or hardware signers that only expose digest signing
pub trait StakerSigner: Send + Sync {
    /// Legacy `EOS...` rendering of the public key
    fn public_key(&self) -> String;

    /// Sign a 32-byte transaction digest.
    fn sign_digest(&self, digest: &[u8; 32]) -> std::result::Result<Signature, String>;
}

/// Compact recoverable secp256k1 signature: `[27 + 4 + recid, r, s]`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 65]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Both `r` and `s` must have the high bit clear and no redundant leading zero byte.
    pub fn is_canonical(&self) -> bool {
        let c = &self.0;
        c[1] & 0x80 == 0
            && !(c[1] == 0 && c[2] & 0x80 == 0)
            && c[33] & 0x80 == 0
            && !(c[33] == 0 && c[34] & 0x80 == 0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIG_K1_{}", encode_with_ripemd_checksum(&self.0, b"K1"))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Signs with a single in-memory secp256k1 key
pub struct K1Signer {
    secret: SecretKey,
    public: PublicKey,
}

impl K1Signer {
    /// Accepts legacy WIF (`5...`) or `PVT_K1_...` encoded keys
    pub fn from_string(key: &str) -> Result<Self> {
        let bytes = decode_private_key(key.trim())?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let secret = SecretKey::parse(bytes)
            .map_err(|e| StakerSdkError::InvalidKey(format!("{:?}", e)))?;
        let public = PublicKey::from_secret_key(&secret);
        Ok(Self { secret, public })
    }

    /// RFC 6979 nonce for `message`, which must already be reduced mod n.
    ///
    /// Attempts after the first feed `counter` in as additional data so a
    /// non-canonical result can be retried with a fresh nonce.
    fn nonce(&self, message: &[u8; 32], counter: u32) -> [u8; 32] {
        let secret = self.secret.serialize();
        let extra = counter.to_be_bytes();
        let data: &[u8] = if counter == 0 { &[] } else { &extra };

        rfc6979::generate_k::<Sha256, U32>(
            GenericArray::from_slice(&secret),
            GenericArray::from_slice(&CURVE_ORDER),
            GenericArray::from_slice(message),
            data,
        )
        .into()
    }
}

impl StakerSigner for K1Signer {
    fn public_key(&self) -> String {
        format!(
            "EOS{}",
            encode_with_ripemd_checksum(&self.public.serialize_compressed(), b"")
        )
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> std::result::Result<Signature, String> {
        let mut seckey = Scalar::default();
        let _ = seckey.set_b32(&self.secret.serialize());
        let mut message = Scalar::default();
        let _ = message.set_b32(digest);
        let reduced = message.b32();

        for counter in 0..u32::MAX {
            let mut nonce = Scalar::default();
            let overflow = bool::from(nonce.set_b32(&self.nonce(&reduced, counter)));
            if overflow || nonce.is_zero() {
                continue;
            }

            // s is normalized to the low half by sign_raw
            let Ok((r, s, recid)) = ECMULT_GEN_CONTEXT.sign_raw(&seckey, &message, &nonce) else {
                continue;
            };

            let mut compact = [0u8; 65];
            compact[0] = 27 + 4 + recid;
            compact[1..33].copy_from_slice(&r.b32());
            compact[33..65].copy_from_slice(&s.b32());

            let signature = Signature(compact);
            if signature.is_canonical() {
                return Ok(signature);
            }
        }

        Err("no canonical signature found".to_string())
    }
}

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

fn ripemd_checksum(data: &[u8], suffix: &[u8]) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    let hash = hasher.finalize();
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_with_ripemd_checksum(data: &[u8], suffix: &[u8]) -> String {
    let mut buf = data.to_vec();
    buf.extend_from_slice(&ripemd_checksum(data, suffix));
    bs58::encode(buf).into_string()
}

/// Decode a WIF or `PVT_K1_` private key into its raw 32 bytes
pub fn decode_private_key(key: &str) -> Result<[u8; 32]> {
    let invalid = |reason: &str| StakerSdkError::InvalidKey(reason.to_string());

    if let Some(body) = key.strip_prefix("PVT_K1_") {
        let raw = bs58::decode(body)
            .into_vec()
            .map_err(|e| invalid(&e.to_string()))?;
        if raw.len() != 36 {
            return Err(invalid("PVT_K1 key must decode to 36 bytes"));
        }
        if ripemd_checksum(&raw[..32], b"K1") != raw[32..] {
            return Err(invalid("checksum mismatch"));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&raw[..32]);
        return Ok(out);
    }

    let raw = bs58::decode(key)
        .into_vec()
        .map_err(|e| invalid(&e.to_string()))?;
    if raw.len() != 37 {
        return Err(invalid("WIF key must decode to 37 bytes"));
    }
    if raw[0] != 0x80 {
        return Err(invalid("WIF key must start with version byte 0x80"));
    }
    if sha256(&sha256(&raw[..33]))[..4] != raw[33..] {
        return Err(invalid("checksum mismatch"));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&raw[1..33]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsecp256k1::{Message, RecoveryId};

    const DEV_KEY: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
    const DEV_PUB: &str = "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV";

    #[test]
    fn test_wif_key_derives_known_public_key() {
        let signer = K1Signer::from_string(DEV_KEY).unwrap();
        assert_eq!(signer.public_key(), DEV_PUB);
    }

    #[test]
    fn test_pvt_k1_form_matches_wif() {
        let raw = decode_private_key(DEV_KEY).unwrap();
        let pvt = format!("PVT_K1_{}", encode_with_ripemd_checksum(&raw, b"K1"));
        assert_eq!(decode_private_key(&pvt).unwrap(), raw);
    }

    #[test]
    fn test_rejects_corrupted_key() {
        let mut corrupted = DEV_KEY.to_string();
        corrupted.replace_range(10..11, "z");
        assert!(K1Signer::from_string(&corrupted).is_err());
        assert!(K1Signer::from_string("not-a-key").is_err());
    }

    #[test]
    fn test_signatures_are_canonical_and_recoverable() {
        let signer = K1Signer::from_string(DEV_KEY).unwrap();
        for i in 0u8..16 {
            let digest = sha256(&[i; 7]);
            let sig = signer.sign_digest(&digest).unwrap();
            assert!(sig.is_canonical());

            let recid = RecoveryId::parse(sig.0[0] - 31).unwrap();
            let parsed = libsecp256k1::Signature::parse_standard_slice(&sig.0[1..]).unwrap();
            let recovered =
                libsecp256k1::recover(&Message::parse(&digest), &parsed, &recid).unwrap();
            assert_eq!(
                recovered.serialize_compressed(),
                signer.public.serialize_compressed()
            );
        }
    }

    #[test]
    fn test_nonce_matches_rfc6979_vectors() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let signer = K1Signer::from_bytes(&one).unwrap();

        let digest = sha256(b"Satoshi Nakamoto");
        assert_eq!(
            hex::encode(signer.nonce(&digest, 0)),
            "8f8a276c19f4149656b280621e358cce24f5f52542772691ee69063b74f15d15"
        );
        let digest = sha256(
            b"All those moments will be lost in time, like tears in rain. Time to die...",
        );
        assert_eq!(
            hex::encode(signer.nonce(&digest, 0)),
            "38aa22d72376b4dbc472e06c3ba403ee0a394da63fc58d88686c611aba98d6b3"
        );
        assert_ne!(signer.nonce(&digest, 0), signer.nonce(&digest, 1));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = K1Signer::from_string(DEV_KEY).unwrap();
        let digest = sha256(b"delegate");
        assert_eq!(
            signer.sign_digest(&digest).unwrap(),
            signer.sign_digest(&digest).unwrap()
        );
        assert!(signer
            .sign_digest(&digest)
            .unwrap()
            .to_string()
            .starts_with("SIG_K1_"));
    }
}
