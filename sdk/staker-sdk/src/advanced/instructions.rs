use crate::advanced::serializer::{Pack, Serializer};
use crate::core::constants::{DELEGATE_ACTION, SYSTEM_CONTRACT};
use crate::error::Result;
use crate::types::{AccountName, Asset};

/// Actor plus permission authorizing an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionLevel {
    pub actor: AccountName,
    pub permission: AccountName,
}

impl Pack for PermissionLevel {
    fn pack(&self, s: &mut Serializer) -> Result<()> {
        s.write_name(&self.actor);
        s.write_name(&self.permission);
        Ok(())
    }
}

/// A contract call with already-packed argument data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub account: AccountName,
    pub name: AccountName,
    pub authorization: Vec<PermissionLevel>,
    pub data: Vec<u8>,
}

impl Pack for Action {
    fn pack(&self, s: &mut Serializer) -> Result<()> {
        s.write_name(&self.account);
        s.write_name(&self.name);
        self.authorization.as_slice().pack(s)?;
        s.write_bytes(&self.data)
    }
}

/// Arguments of the system contract's `delegatebw` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateBw {
    pub from: AccountName,
    pub receiver: AccountName,
    pub stake_net_quantity: Asset,
    pub stake_cpu_quantity: Asset,
    pub transfer: bool,
}

impl Pack for DelegateBw {
    fn pack(&self, s: &mut Serializer) -> Result<()> {
        s.write_name(&self.from);
        s.write_name(&self.receiver);
        s.write_asset(&self.stake_net_quantity);
        s.write_asset(&self.stake_cpu_quantity);
        s.write_bool(self.transfer);
        Ok(())
    }
}

/// Build a `delegatebw` action staking `net` and `cpu` from `from` to `receiver`.
///
/// Ownership of the stake stays with `from` (`transfer = false`).
pub fn delegatebw(
    from: &AccountName,
    permission: &AccountName,
    receiver: &AccountName,
    net: Asset,
    cpu: Asset,
) -> Result<Action> {
    let args = DelegateBw {
        from: from.clone(),
        receiver: receiver.clone(),
        stake_net_quantity: net,
        stake_cpu_quantity: cpu,
        transfer: false,
    };

    Ok(Action {
        account: AccountName::new(SYSTEM_CONTRACT)?,
        name: AccountName::new(DELEGATE_ACTION)?,
        authorization: vec![PermissionLevel {
            actor: from.clone(),
            permission: permission.clone(),
        }],
        data: args.to_bytes()?,
    })
}
