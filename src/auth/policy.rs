//! Who may do what inside a clinic.

use std::{fmt, str::FromStr};

use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    Doctor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Read clinic records: departments, doctors, appointments, walk-ins.
    View,
    /// Book appointments and move them through their statuses.
    ManageAppointments,
    ManageWalkIns,
    /// Clinic settings, departments, doctors and deactivation.
    ConfigureClinic,
    ManageMembers,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Doctor => "doctor",
        }
    }

    pub fn permits(self, action: Action) -> bool {
        match self {
            Role::Admin => true,
            Role::Staff => matches!(
                action,
                Action::View | Action::ManageAppointments | Action::ManageWalkIns
            ),
            Role::Doctor => matches!(action, Action::View | Action::ManageAppointments),
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "doctor" => Ok(Role::Doctor),
            other => Err(ApiError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ACTIONS: [Action; 5] = [
        Action::View,
        Action::ManageAppointments,
        Action::ManageWalkIns,
        Action::ConfigureClinic,
        Action::ManageMembers,
    ];

    #[test]
    fn admin_can_do_everything() {
        assert!(ALL_ACTIONS.iter().all(|a| Role::Admin.permits(*a)));
    }

    #[test]
    fn only_admin_configures() {
        for role in [Role::Staff, Role::Doctor] {
            assert!(!role.permits(Action::ConfigureClinic));
            assert!(!role.permits(Action::ManageMembers));
        }
    }

    #[test]
    fn doctors_do_not_handle_walk_ins() {
        assert!(Role::Staff.permits(Action::ManageWalkIns));
        assert!(!Role::Doctor.permits(Action::ManageWalkIns));
        assert!(Role::Doctor.permits(Action::ManageAppointments));
    }

    #[test]
    fn roles_parse_from_their_names() {
        for role in [Role::Admin, Role::Staff, Role::Doctor] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
