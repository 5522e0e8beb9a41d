//! Admin, whitelisted and pauser role sets with a single transferable super-admin.

use alloy_primitives::Address;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::errors::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Whitelisted,
    Pauser,
}

#[derive(Clone, Debug)]
pub struct RoleRegistry {
    super_admin: Address,
    admins: HashSet<Address>,
    whitelisted: HashSet<Address>,
    pausers: HashSet<Address>,
}

impl RoleRegistry {
    /// Seed `deployer` as super-admin, sole admin and sole pauser.
    pub fn new(deployer: Address) -> Self {
        Self {
            super_admin: deployer,
            admins: HashSet::from([deployer]),
            whitelisted: HashSet::new(),
            pausers: HashSet::from([deployer]),
        }
    }

    pub fn super_admin(&self) -> Address {
        self.super_admin
    }

    pub fn is_admin(&self, account: Address) -> bool {
        self.admins.contains(&account)
    }

    pub fn is_whitelisted(&self, account: Address) -> bool {
        self.whitelisted.contains(&account)
    }

    pub fn is_pauser(&self, account: Address) -> bool {
        self.pausers.contains(&account)
    }

    pub fn has(&self, role: Role, account: Address) -> bool {
        match role {
            Role::Admin => self.is_admin(account),
            Role::Whitelisted => self.is_whitelisted(account),
            Role::Pauser => self.is_pauser(account),
        }
    }

    /// Fail with the role's authorization error unless `caller` holds `role`.
    pub fn require(&self, role: Role, caller: Address) -> Result<(), Errors> {
        if self.has(role, caller) {
            return Ok(());
        }

        warn!(?role, %caller, "caller lacks role");
        Err(match role {
            Role::Admin => Errors::NotAdmin(NotAdmin {}),
            Role::Whitelisted => Errors::NotWhitelisted(NotWhitelisted {}),
            Role::Pauser => Errors::NotPauser(NotPauser {}),
        })
    }

    pub fn add_admin(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.grant(caller, Role::Admin, account)
    }

    pub fn remove_admin(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.revoke(caller, Role::Admin, account)
    }

    /// Hand the caller's admin role over to `account`.
    pub fn set_admin(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.grant(caller, Role::Admin, account)?;
        if account != caller {
            self.admins.remove(&caller);
        }
        Ok(())
    }

    pub fn renounce_admin(&mut self, caller: Address) -> Result<(), Errors> {
        self.require(Role::Admin, caller)?;
        self.admins.remove(&caller);
        info!(%caller, "admin renounced");
        Ok(())
    }

    pub fn add_whitelisted(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.grant(caller, Role::Whitelisted, account)
    }

    pub fn remove_whitelisted(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.revoke(caller, Role::Whitelisted, account)
    }

    pub fn add_pauser(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.validate_sender_is_super_admin(caller)?;
        self.validate_address(account)?;
        self.pausers.insert(account);
        info!(%account, "pauser added");
        Ok(())
    }

    pub fn remove_pauser(&mut self, caller: Address, account: Address) -> Result<(), Errors> {
        self.validate_sender_is_super_admin(caller)?;
        self.pausers.remove(&account);
        info!(%account, "pauser removed");
        Ok(())
    }

    pub fn transfer_super_admin(&mut self, caller: Address, new_super_admin: Address) -> Result<(), Errors> {
        self.validate_sender_is_super_admin(caller)?;
        self.validate_address(new_super_admin)?;
        self.super_admin = new_super_admin;
        info!(%new_super_admin, "super admin transferred");
        Ok(())
    }

    // Admin-gated grant. There is no floor on the number of admins.
    fn grant(&mut self, caller: Address, role: Role, account: Address) -> Result<(), Errors> {
        self.require(Role::Admin, caller)?;
        self.validate_address(account)?;
        self.set_mut(role).insert(account);
        info!(?role, %account, "role granted");
        Ok(())
    }

    fn revoke(&mut self, caller: Address, role: Role, account: Address) -> Result<(), Errors> {
        self.require(Role::Admin, caller)?;
        self.set_mut(role).remove(&account);
        info!(?role, %account, "role revoked");
        Ok(())
    }

    fn set_mut(&mut self, role: Role) -> &mut HashSet<Address> {
        match role {
            Role::Admin => &mut self.admins,
            Role::Whitelisted => &mut self.whitelisted,
            Role::Pauser => &mut self.pausers,
        }
    }

    /// Function ensuring caller is the super admin
    fn validate_sender_is_super_admin(&self, caller: Address) -> Result<(), Errors> {
        if caller != self.super_admin {
            return Err(Errors::NotSuperAdmin(NotSuperAdmin {}));
        }

        Ok(())
    }

    /// Function ensuring that a zero value is not supplied for an address
    fn validate_address(&self, value: Address) -> Result<(), Errors> {
        if value == Address::ZERO {
            return Err(Errors::InvalidAddress(InvalidAddress {}));
        }

        Ok(())
    }
}
