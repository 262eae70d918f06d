//! Dashboard user roles and permissions

use serde::{Deserialize, Serialize};

/// Resources that can be accessed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Analytics,
    Imports,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Analytics => "analytics",
            Resource::Imports => "imports",
        }
    }
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Export,
    Create,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Export => "export",
            Action::Create => "create",
        }
    }
}

/// A permission granting access to a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub resource: Resource,
    pub actions: Vec<Action>,
}

impl Permission {
    /// Flatten into "resource:action" claim strings
    pub fn claims(&self) -> impl Iterator<Item = String> + '_ {
        self.actions
            .iter()
            .map(move |action| format!("{}:{}", self.resource.as_str(), action.as_str()))
    }
}

/// Built-in dashboard roles
pub fn default_roles() -> Vec<(&'static str, Vec<Permission>)> {
    vec![
        (
            "admin",
            vec![
                Permission {
                    resource: Resource::Analytics,
                    actions: vec![Action::View, Action::Export],
                },
                Permission {
                    resource: Resource::Imports,
                    actions: vec![Action::Create],
                },
            ],
        ),
        (
            "analyst",
            vec![Permission {
                resource: Resource::Analytics,
                actions: vec![Action::View, Action::Export],
            }],
        ),
        (
            "viewer",
            vec![Permission {
                resource: Resource::Analytics,
                actions: vec![Action::View],
            }],
        ),
    ]
}

/// Permission claims for a role name; unknown roles get none
pub fn permissions_for_role(role: &str) -> Vec<String> {
    default_roles()
        .into_iter()
        .find(|(name, _)| *name == role)
        .map(|(_, permissions)| permissions.iter().flat_map(|p| p.claims()).collect())
        .unwrap_or_default()
}
