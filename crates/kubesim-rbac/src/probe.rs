//! Interactive access probe: a selected role, resource and verb, with
//! the decision recomputed on every selection change.

use tracing::debug;

use crate::matrix::{AccessDecision, AccessMatrix, Role, Verb};

const DEFAULT_RESOURCE: &str = "pods";

#[derive(Debug, Clone)]
pub struct AccessProbe {
    matrix: AccessMatrix,
    role: Role,
    resource: String,
    verb: Verb,
    decision: Option<AccessDecision>,
}

impl AccessProbe {
    /// Start at (none, pods, get), already evaluated.
    pub fn new(matrix: AccessMatrix) -> Self {
        let mut probe = Self {
            matrix,
            role: Role::None,
            resource: DEFAULT_RESOURCE.to_string(),
            verb: Verb::Get,
            decision: None,
        };
        probe.evaluate();
        probe
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// `None` only right after `reset`, before any selection.
    pub fn decision(&self) -> Option<AccessDecision> {
        self.decision
    }

    pub fn select_role(&mut self, role: Role) -> AccessDecision {
        self.role = role;
        self.evaluate()
    }

    pub fn select_resource(&mut self, resource: &str) -> AccessDecision {
        self.resource = resource.to_string();
        self.evaluate()
    }

    pub fn select_verb(&mut self, verb: Verb) -> AccessDecision {
        self.verb = verb;
        self.evaluate()
    }

    /// Back to (none, pods, get) with the decision cleared.
    pub fn reset(&mut self) {
        self.role = Role::None;
        self.resource = DEFAULT_RESOURCE.to_string();
        self.verb = Verb::Get;
        self.decision = None;
    }

    fn evaluate(&mut self) -> AccessDecision {
        let decision = self.matrix.check(self.role, &self.resource, self.verb);
        debug!(
            role = %self.role,
            resource = %self.resource,
            verb = %self.verb,
            ?decision,
            "access evaluated"
        );
        self.decision = Some(decision);
        decision
    }
}

impl Default for AccessProbe {
    fn default() -> Self {
        Self::new(AccessMatrix::cluster_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_denied_with_no_role() {
        let probe = AccessProbe::default();
        assert_eq!(probe.role(), Role::None);
        assert_eq!(probe.resource(), "pods");
        assert_eq!(probe.decision(), Some(AccessDecision::Denied));
    }

    #[test]
    fn selections_reevaluate() {
        let mut probe = AccessProbe::default();
        assert_eq!(probe.select_role(Role::Viewer), AccessDecision::Allowed);
        assert_eq!(probe.select_verb(Verb::Delete), AccessDecision::Denied);
        assert_eq!(probe.select_role(Role::Admin), AccessDecision::Allowed);
        assert_eq!(probe.select_resource("secrets"), AccessDecision::Allowed);
        assert_eq!(probe.select_role(Role::Editor), AccessDecision::Denied);
        assert_eq!(probe.select_verb(Verb::List), AccessDecision::Allowed);
    }

    #[test]
    fn unknown_resource_denied() {
        let mut probe = AccessProbe::default();
        probe.select_role(Role::Admin);
        assert_eq!(probe.select_resource("nodes"), AccessDecision::Denied);
    }

    #[test]
    fn reset_clears_selection_and_decision() {
        let mut probe = AccessProbe::default();
        probe.select_role(Role::Admin);
        probe.select_resource("secrets");
        probe.select_verb(Verb::Exec);

        probe.reset();
        assert_eq!(probe.role(), Role::None);
        assert_eq!(probe.resource(), "pods");
        assert_eq!(probe.verb(), Verb::Get);
        assert_eq!(probe.decision(), None);
    }
}
