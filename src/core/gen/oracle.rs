use crate::core::{
    dfa::{Dfa, DfaState},
    gen::config::SynthesisConfig,
};

/// Decides whether a state's edges may be rendered as a multi-way dispatch.
pub trait SwitchOracle: Send + Sync {
    fn can_switch(&self, dfa: &Dfa, state: &DfaState) -> bool;
}

pub struct NeverSwitch;

impl SwitchOracle for NeverSwitch {
    fn can_switch(&self, _dfa: &Dfa, _state: &DfaState) -> bool {
        false
    }
}

/// Allows a switch only when every edge is a plain value test that needs no
/// predicate, and the case count stays within configured limits.
pub struct CaseLimitOracle {
    enabled: bool,
    min_alts: usize,
    max_case_labels: usize,
}

impl CaseLimitOracle {
    pub fn new(enabled: bool, min_alts: usize, max_case_labels: usize) -> Self {
        CaseLimitOracle {
            enabled,
            min_alts,
            max_case_labels,
        }
    }

    pub fn from_config(config: &SynthesisConfig) -> Self {
        CaseLimitOracle::new(
            config.generate_switches,
            config.min_switch_alts,
            config.max_switch_case_labels,
        )
    }
}

impl SwitchOracle for CaseLimitOracle {
    fn can_switch(&self, dfa: &Dfa, state: &DfaState) -> bool {
        if !self.enabled {
            return false;
        }

        let mut case_labels = 0;
        for transition in state.transitions() {
            let label = transition.label();
            if label.is_semantic_predicate() {
                return false;
            }

            let target = match dfa.state(transition.target()) {
                Some(target) => target,
                None => return false,
            };

            if label.is_eot() {
                // An EOT target that still branches splits on predicates.
                if target.uniquely_predicted_alt().is_none() {
                    return false;
                }
            }

            if target.gated_predicates().is_some() {
                return false;
            }

            if let Some(values) = label.value_set() {
                case_labels = values.size().saturating_add(case_labels);
            }
        }

        state.transitions().len() >= self.min_alts && case_labels <= self.max_case_labels
    }
}
