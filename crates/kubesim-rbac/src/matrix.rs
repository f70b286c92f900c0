//! Role × resource × verb permission table.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RbacError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
    /// No role selected. Never granted anything.
    None,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Editor, Role::Viewer, Role::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
            Role::None => "none",
        }
    }
}

impl FromStr for Role {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RbacError::UnknownRole(s.to_string()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Get,
    List,
    Create,
    Update,
    Delete,
    Exec,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Get,
        Verb::List,
        Verb::Create,
        Verb::Update,
        Verb::Delete,
        Verb::Exec,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::Exec => "exec",
        }
    }
}

impl FromStr for Verb {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RbacError::UnknownVerb(s.to_string()))
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Which roles hold each verb, per resource.
#[derive(Debug, Clone, Default)]
pub struct AccessMatrix {
    rules: BTreeMap<String, HashMap<Verb, HashSet<Role>>>,
}

impl AccessMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table used by the cluster RBAC demo.
    ///
    /// Viewers read workloads, editors also write them, and only admins
    /// delete, exec, or touch secrets (editors may list secret names).
    pub fn cluster_defaults() -> Self {
        use Role::{Admin, Editor, Viewer};
        use Verb::*;

        let mut m = Self::new();
        for workload in ["pods", "deployments"] {
            m.grant(workload, &[Get, List], &[Admin, Editor, Viewer]);
            m.grant(workload, &[Create, Update], &[Admin, Editor]);
            m.grant(workload, &[Delete, Exec], &[Admin]);
        }
        m.grant("secrets", &Verb::ALL, &[Admin]);
        m.grant("secrets", &[List], &[Editor]);
        m
    }

    /// Allow `roles` to perform `verbs` on `resource`. `Role::None` is
    /// never stored.
    pub fn grant(&mut self, resource: &str, verbs: &[Verb], roles: &[Role]) {
        let entry = self.rules.entry(resource_key(resource)).or_default();
        for verb in verbs {
            let holders = entry.entry(*verb).or_default();
            holders.extend(roles.iter().copied().filter(|r| *r != Role::None));
        }
    }

    /// Resource names, sorted.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Resource names match case-insensitively, ignoring surrounding space.
    pub fn check(&self, role: Role, resource: &str, verb: Verb) -> AccessDecision {
        let allowed = self
            .rules
            .get(&resource_key(resource))
            .and_then(|verbs| verbs.get(&verb))
            .is_some_and(|roles| roles.contains(&role));

        if allowed {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }

    /// Verbs `role` holds on `resource`, in declaration order.
    pub fn verbs_for(&self, role: Role, resource: &str) -> Vec<Verb> {
        Verb::ALL
            .into_iter()
            .filter(|v| self.check(role, resource, *v).is_allowed())
            .collect()
    }
}

fn resource_key(resource: &str) -> String {
    resource.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_reads_workloads_only() {
        let m = AccessMatrix::cluster_defaults();
        assert_eq!(m.verbs_for(Role::Viewer, "pods"), vec![Verb::Get, Verb::List]);
        assert_eq!(
            m.verbs_for(Role::Viewer, "deployments"),
            vec![Verb::Get, Verb::List]
        );
        assert!(m.verbs_for(Role::Viewer, "secrets").is_empty());
    }

    #[test]
    fn editor_writes_but_cannot_delete_or_exec() {
        let m = AccessMatrix::cluster_defaults();
        assert_eq!(
            m.verbs_for(Role::Editor, "pods"),
            vec![Verb::Get, Verb::List, Verb::Create, Verb::Update]
        );
        assert_eq!(m.check(Role::Editor, "pods", Verb::Exec), AccessDecision::Denied);
    }

    #[test]
    fn editor_may_only_list_secrets() {
        let m = AccessMatrix::cluster_defaults();
        assert_eq!(m.verbs_for(Role::Editor, "secrets"), vec![Verb::List]);
    }

    #[test]
    fn admin_holds_everything() {
        let m = AccessMatrix::cluster_defaults();
        for resource in ["pods", "deployments", "secrets"] {
            assert_eq!(m.verbs_for(Role::Admin, resource), Verb::ALL.to_vec());
        }
    }

    #[test]
    fn none_role_and_unknown_resources_denied() {
        let mut m = AccessMatrix::cluster_defaults();
        m.grant("pods", &[Verb::Get], &[Role::None]);
        assert_eq!(m.check(Role::None, "pods", Verb::Get), AccessDecision::Denied);
        assert_eq!(
            m.check(Role::Admin, "configmaps", Verb::Get),
            AccessDecision::Denied
        );
    }

    #[test]
    fn resource_names_ignore_case_and_padding() {
        let m = AccessMatrix::cluster_defaults();
        assert_eq!(m.check(Role::Admin, "Pods", Verb::Get), AccessDecision::Allowed);
        assert_eq!(m.check(Role::Viewer, " DEPLOYMENTS ", Verb::List), AccessDecision::Allowed);
        assert_eq!(m.check(Role::Viewer, "Secrets", Verb::Get), AccessDecision::Denied);

        let mut m = AccessMatrix::new();
        m.grant(" ConfigMaps", &[Verb::Get], &[Role::Viewer]);
        assert_eq!(m.resources().collect::<Vec<_>>(), vec!["configmaps"]);
        assert_eq!(m.check(Role::Viewer, "configmaps", Verb::Get), AccessDecision::Allowed);
    }

    #[test]
    fn resources_are_sorted() {
        let m = AccessMatrix::cluster_defaults();
        assert_eq!(
            m.resources().collect::<Vec<_>>(),
            vec!["deployments", "pods", "secrets"]
        );
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" exec ".parse::<Verb>().unwrap(), Verb::Exec);
        assert_eq!(
            "root".parse::<Role>(),
            Err(RbacError::UnknownRole("root".to_string()))
        );
        assert_eq!(
            "patch".parse::<Verb>(),
            Err(RbacError::UnknownVerb("patch".to_string()))
        );
    }

    #[test]
    fn decision_serializes_snake_case() {
        let json = serde_json::to_string(&AccessDecision::Allowed).unwrap();
        assert_eq!(json, r#""allowed""#);
    }
}
