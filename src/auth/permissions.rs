use crate::storage::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageAllEquipment,
    ManageOwnEquipment,
    ManageUsers,
}

/// Capabilities granted to a caller. Derived from the role on every request, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub manage_all_equipment: bool,
    pub manage_own_equipment: bool,
    pub manage_users: bool,
}

impl Permissions {
    pub const ANONYMOUS: Permissions = Permissions {
        manage_all_equipment: false,
        manage_own_equipment: false,
        manage_users: false,
    };

    /// `None` is an anonymous caller
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            None => Self::ANONYMOUS,
            Some(Role::User) => Permissions {
                manage_own_equipment: true,
                ..Self::ANONYMOUS
            },
            Some(Role::Manager) => Permissions {
                manage_own_equipment: true,
                manage_users: true,
                ..Self::ANONYMOUS
            },
            Some(Role::Admin) => Permissions {
                manage_all_equipment: true,
                manage_own_equipment: true,
                manage_users: true,
            },
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageAllEquipment => self.manage_all_equipment,
            Capability::ManageOwnEquipment => self.manage_own_equipment,
            Capability::ManageUsers => self.manage_users,
        }
    }
}
