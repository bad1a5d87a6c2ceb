use crate::advanced::instructions::{self, Action};
use crate::advanced::serializer::{Pack, Serializer};
use crate::basic::retry::RetryPolicy;
use crate::core::connection::LedgerConnection;
use crate::core::constants::{DEFAULT_EXPIRATION, DEFAULT_PERMISSION};
use crate::core::signer::{Signature, StakerSigner};
use crate::error::{Result, StakerSdkError};
use crate::types::{AccountName, Asset, ChainInfo};
use crate::utils;
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A transaction ready to be signed for a specific chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Unix seconds
    pub expiration: u32,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub actions: Vec<Action>,
    pub chain_id: [u8; 32],
}

impl UnsignedTransaction {
    pub fn new(actions: Vec<Action>, chain: &ChainInfo, expiration: u32) -> Self {
        Self {
            expiration,
            ref_block_num: chain.ref_block_num(),
            ref_block_prefix: chain.ref_block_prefix(),
            actions,
            chain_id: chain.chain_id,
        }
    }

    /// Packed transaction bytes (header, no context-free actions, actions, no extensions)
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut s = Serializer::new();
        s.write_u32(self.expiration);
        s.write_u16(self.ref_block_num);
        s.write_u32(self.ref_block_prefix);
        s.write_varuint32(0); // max_net_usage_words
        s.write_u8(0); // max_cpu_usage_ms
        s.write_varuint32(0); // delay_sec
        s.write_len(0)?; // context_free_actions
        self.actions.as_slice().pack(&mut s)?;
        s.write_len(0)?; // transaction_extensions
        Ok(s.finish())
    }

    /// `sha256(chain_id || packed_trx || zeroed context-free data digest)`
    pub fn signing_digest(&self, packed: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.chain_id);
        hasher.update(packed);
        hasher.update([0u8; 32]);
        hasher.finalize().into()
    }

    /// Pack and sign with every signer, in order
    pub fn sign(self, signers: &[&dyn StakerSigner]) -> Result<SignedTransaction> {
        let packed_trx = self.pack()?;
        let digest = self.signing_digest(&packed_trx);

        let signatures = signers
            .iter()
            .map(|signer| {
                signer.sign_digest(&digest).map_err(|e| {
                    StakerSdkError::Signing(format!("key {}: {}", signer.public_key(), e))
                })
            })
            .collect::<Result<Vec<Signature>>>()?;

        Ok(SignedTransaction {
            transaction: self,
            packed_trx,
            signatures,
        })
    }
}

/// Wire-ready transaction plus its signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: UnsignedTransaction,
    pub packed_trx: Vec<u8>,
    pub signatures: Vec<Signature>,
}

impl SignedTransaction {
    /// Transaction id as the ledger computes it: sha256 of the packed body
    pub fn id(&self) -> String {
        hex::encode(Sha256::digest(&self.packed_trx))
    }

    pub fn packed_hex(&self) -> String {
        hex::encode(&self.packed_trx)
    }
}

/// Builds one multi-action `delegatebw` transaction for a set of receivers.
pub struct DelegateBuilder<'a> {
    custodian: AccountName,
    permission: Option<AccountName>,
    receivers: &'a [AccountName],
    cpu: Option<Asset>,
    net: Option<Asset>,
    expiration: Duration,
}

impl<'a> DelegateBuilder<'a> {
    pub fn new(custodian: AccountName) -> Self {
        Self {
            custodian,
            permission: None,
            receivers: &[],
            cpu: None,
            net: None,
            expiration: DEFAULT_EXPIRATION,
        }
    }

    pub fn with_permission(mut self, permission: AccountName) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn with_receivers(mut self, receivers: &'a [AccountName]) -> Self {
        self.receivers = receivers;
        self
    }

    pub fn with_cpu(mut self, cpu: Asset) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn with_net(mut self, net: Asset) -> Self {
        self.net = Some(net);
        self
    }

    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// One action per receiver, in receiver order
    pub fn build_actions(&self) -> Result<Vec<Action>> {
        if self.receivers.is_empty() {
            return Err(StakerSdkError::Other("No receivers to delegate to".into()));
        }

        let (cpu, net) = match (self.cpu, self.net) {
            (Some(cpu), Some(net)) => (cpu, net),
            (Some(cpu), None) => (cpu, Asset::zero(cpu.symbol)),
            (None, Some(net)) => (Asset::zero(net.symbol), net),
            (None, None) => return Err(StakerSdkError::Other("CPU or NET amount required".into())),
        };
        if cpu.symbol != net.symbol {
            return Err(StakerSdkError::InvalidAsset(format!(
                "CPU {} and NET {} use different symbols",
                cpu, net
            )));
        }

        let permission = match &self.permission {
            Some(p) => p.clone(),
            None => AccountName::new(DEFAULT_PERMISSION)?,
        };

        self.receivers
            .iter()
            .map(|receiver| {
                instructions::delegatebw(&self.custodian, &permission, receiver, net, cpu)
            })
            .collect()
    }

    /// Build against fresh chain reference data.
    ///
    /// Chain info is fetched on every call, so each rebuild gets a new
    /// expiration and reference block.
    pub async fn build_transaction(
        &self,
        connection: &impl LedgerConnection,
        policy: &RetryPolicy,
    ) -> Result<UnsignedTransaction> {
        let actions = self.build_actions()?;
        let chain = utils::fetch_chain_info(connection, policy).await?;
        Ok(UnsignedTransaction::new(
            actions,
            &chain,
            expiration_from_now(self.expiration)?,
        ))
    }
}

fn expiration_from_now(ttl: Duration) -> Result<u32> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| StakerSdkError::Other(format!("system clock before epoch: {}", e)))?;
    u32::try_from((now + ttl).as_secs())
        .map_err(|_| StakerSdkError::Encoding("expiration does not fit u32 seconds".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;

    fn chain() -> ChainInfo {
        let mut head = [0u8; 32];
        head[..4].copy_from_slice(&0x0001_0203u32.to_be_bytes());
        head[8..12].copy_from_slice(&[1, 2, 3, 4]);
        ChainInfo {
            chain_id: [7u8; 32],
            head_block_id: head,
            head_block_num: 0x0001_0203,
        }
    }

    fn receivers(names: &[&str]) -> Vec<AccountName> {
        names.iter().map(|n| AccountName::new(*n).unwrap()).collect()
    }

    #[test]
    fn test_build_actions_one_per_receiver() {
        let wax = Symbol::new("WAX", 8).unwrap();
        let receivers = receivers(&["alice", "bob", "carol"]);
        let actions = DelegateBuilder::new(AccountName::new("custodian").unwrap())
            .with_receivers(&receivers)
            .with_cpu(Asset::new(333, wax))
            .build_actions()
            .unwrap();

        assert_eq!(actions.len(), 3);
        for (action, receiver) in actions.iter().zip(&receivers) {
            assert_eq!(action.authorization[0].permission.as_str(), "active");
            // receiver sits right after `from`
            assert_eq!(&action.data[8..16], &receiver.value().to_le_bytes());
        }
    }

    #[test]
    fn test_build_actions_requires_receivers_and_amount() {
        let wax = Symbol::new("WAX", 8).unwrap();
        let custodian = AccountName::new("custodian").unwrap();
        assert!(DelegateBuilder::new(custodian.clone())
            .with_cpu(Asset::new(1, wax))
            .build_actions()
            .is_err());

        let receivers = receivers(&["alice"]);
        assert!(DelegateBuilder::new(custodian)
            .with_receivers(&receivers)
            .build_actions()
            .is_err());
    }

    #[test]
    fn test_pack_header_layout() {
        let tx = UnsignedTransaction::new(vec![], &chain(), 0x6000_0000);
        let packed = tx.pack().unwrap();
        assert_eq!(
            hex::encode(&packed),
            concat!("00000060", "0302", "01020304", "00", "00", "00", "00", "00", "00")
        );
    }

    #[test]
    fn test_signing_digest_binds_chain_id() {
        let tx = UnsignedTransaction::new(vec![], &chain(), 1);
        let packed = tx.pack().unwrap();
        let mut other = tx.clone();
        other.chain_id = [8u8; 32];
        assert_ne!(tx.signing_digest(&packed), other.signing_digest(&packed));
    }
}
