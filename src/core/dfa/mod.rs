use {
    crate::core::{
        data::map::IdMap,
        dfa::{
            label::{Label, LabelKind},
            predicate::SemanticContext,
        },
    },
    std::{error, fmt},
};

pub mod label;
pub mod predicate;

pub type StateId = usize;
pub type Alt = usize;

/// Classification of the grammar construct whose decision the automaton encodes.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum DecisionType {
    Plain,
    LoopBack,
    OptionalBlockStart,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Transition {
    label: Label,
    target: StateId,
}

impl Transition {
    pub fn new(label: Label, target: StateId) -> Self {
        Transition { label, target }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn target(&self) -> StateId {
        self.target
    }
}

#[derive(Clone, Debug)]
pub struct DfaState {
    id: StateId,
    accepting: bool,
    predicted_alt: Option<Alt>,
    transitions: Vec<Transition>,
    gated_predicates: Option<SemanticContext>,
    resolved_with_predicates: bool,
}

impl DfaState {
    fn new(id: StateId) -> Self {
        DfaState {
            id,
            accepting: false,
            predicted_alt: None,
            transitions: Vec::new(),
            gated_predicates: None,
            resolved_with_predicates: false,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn gated_predicates(&self) -> Option<&SemanticContext> {
        self.gated_predicates.as_ref()
    }

    pub fn is_resolved_with_predicates(&self) -> bool {
        self.resolved_with_predicates
    }

    /// The alternative this state uniquely predicts, without consistency checks.
    pub fn uniquely_predicted_alt(&self) -> Option<Alt> {
        if self.accepting {
            self.predicted_alt
        } else {
            None
        }
    }
}

pub struct Dfa {
    decision: usize,
    description: String,
    decision_type: DecisionType,
    start: StateId,
    states: IdMap<DfaState>,
}

impl Dfa {
    pub fn decision(&self) -> usize {
        self.decision
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn decision_type(&self) -> DecisionType {
        self.decision_type
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.states.get(id)
    }

    pub fn states(&self) -> impl Iterator<Item = &DfaState> {
        self.states.iter().map(|(_, state)| state)
    }

    /// Checked, read-only view over a single state.
    pub fn view(&self, id: StateId) -> Result<StateView, MalformedError> {
        let state = match self.states.get(id) {
            Some(state) => state,
            None => return Err(MalformedError::MissingState(id)),
        };

        match (state.accepting, state.predicted_alt) {
            (true, None) => return Err(MalformedError::AcceptWithoutAlt(id)),
            (false, Some(alt)) => return Err(MalformedError::AltWithoutAccept(id, alt)),
            _ => {}
        }

        let mut eot: Option<&Transition> = None;
        for transition in &state.transitions {
            if transition.label.kind() != LabelKind::Eot {
                continue;
            }
            if eot.is_some() {
                return Err(MalformedError::MultipleEot(id));
            }
            eot = Some(transition);
        }

        Ok(StateView {
            dfa: self,
            state,
            eot,
        })
    }
}

pub struct StateView<'dfa> {
    dfa: &'dfa Dfa,
    state: &'dfa DfaState,
    eot: Option<&'dfa Transition>,
}

impl<'dfa> StateView<'dfa> {
    pub fn id(&self) -> StateId {
        self.state.id
    }

    pub fn state(&self) -> &'dfa DfaState {
        self.state
    }

    pub fn is_accepting(&self) -> bool {
        self.state.accepting
    }

    pub fn predicted_alt(&self) -> Option<Alt> {
        self.state.predicted_alt
    }

    pub fn gated_predicates(&self) -> Option<&'dfa SemanticContext> {
        self.state.gated_predicates.as_ref()
    }

    pub fn is_resolved_with_predicates(&self) -> bool {
        self.state.resolved_with_predicates
    }

    pub fn transitions(&self) -> &'dfa [Transition] {
        &self.state.transitions
    }

    /// Transitions that consume lookahead, in automaton order.
    pub fn discriminating_transitions(&self) -> impl Iterator<Item = &'dfa Transition> {
        self.state
            .transitions
            .iter()
            .filter(|transition| transition.label.kind() != LabelKind::Eot)
    }

    pub fn eot_transition(&self) -> Option<&'dfa Transition> {
        self.eot
    }

    pub fn decision_type(&self) -> DecisionType {
        self.dfa.decision_type
    }
}

pub trait DfaBuilder<DfaType> {
    fn new() -> Self;
    fn build(self) -> Result<DfaType, DfaError>;
    fn decision(&mut self, number: usize, description: &str) -> &mut Self;
    fn decision_type(&mut self, decision_type: DecisionType) -> &mut Self;
    fn mark_start(&mut self, state: StateId) -> &mut Self;
    fn accept(&mut self, state: StateId, alt: Alt) -> &mut Self;
    fn mark_accepting(&mut self, state: StateId) -> &mut Self;
    fn predict(&mut self, state: StateId, alt: Alt) -> &mut Self;
    fn mark_trans(&mut self, from: StateId, to: StateId, label: Label) -> &mut Self;
    fn gate(&mut self, state: StateId, predicates: SemanticContext) -> &mut Self;
    fn resolve_with_predicates(&mut self, state: StateId) -> &mut Self;
}

/// Builds automata the way the upstream analysis hands them over. Only structural
/// problems are rejected here; state consistency is checked by `Dfa::view`.
pub struct SimpleDfaBuilder {
    decision: usize,
    description: String,
    decision_type: DecisionType,
    start: Option<StateId>,
    states: IdMap<DfaState>,
}

impl SimpleDfaBuilder {
    fn state_mut(&mut self, id: StateId) -> &mut DfaState {
        self.states.get_or_insert_with(id, || DfaState::new(id))
    }
}

impl DfaBuilder<Dfa> for SimpleDfaBuilder {
    fn new() -> Self {
        SimpleDfaBuilder {
            decision: 0,
            description: String::new(),
            decision_type: DecisionType::Plain,
            start: None,
            states: IdMap::new(),
        }
    }

    fn build(self) -> Result<Dfa, DfaError> {
        let start = match self.start {
            Some(start) => start,
            None => return Err(DfaError::BuildErr("No start state was set".to_string())),
        };

        for (id, state) in self.states.iter() {
            for transition in &state.transitions {
                if let Label::Set(ref set) = transition.label {
                    if set.is_empty() {
                        return Err(DfaError::BuildErr(format!(
                            "Empty label set on transition s{} -> s{}",
                            id, transition.target
                        )));
                    }
                    if set.contains(label::EOT) {
                        return Err(DfaError::BuildErr(format!(
                            "Label set on transition s{} -> s{} contains EOT",
                            id, transition.target
                        )));
                    }
                }
            }
        }

        Ok(Dfa {
            decision: self.decision,
            description: self.description,
            decision_type: self.decision_type,
            start,
            states: self.states,
        })
    }

    fn decision(&mut self, number: usize, description: &str) -> &mut Self {
        self.decision = number;
        self.description = description.to_string();
        self
    }

    fn decision_type(&mut self, decision_type: DecisionType) -> &mut Self {
        self.decision_type = decision_type;
        self
    }

    fn mark_start(&mut self, state: StateId) -> &mut Self {
        self.state_mut(state);
        self.start = Some(state);
        self
    }

    fn accept(&mut self, state: StateId, alt: Alt) -> &mut Self {
        self.mark_accepting(state).predict(state, alt)
    }

    fn mark_accepting(&mut self, state: StateId) -> &mut Self {
        self.state_mut(state).accepting = true;
        self
    }

    fn predict(&mut self, state: StateId, alt: Alt) -> &mut Self {
        self.state_mut(state).predicted_alt = Some(alt);
        self
    }

    fn mark_trans(&mut self, from: StateId, to: StateId, label: Label) -> &mut Self {
        self.state_mut(to);
        self.state_mut(from)
            .transitions
            .push(Transition::new(label, to));
        self
    }

    fn gate(&mut self, state: StateId, predicates: SemanticContext) -> &mut Self {
        let gated = &mut self.state_mut(state).gated_predicates;
        *gated = Some(match gated.take() {
            None => predicates,
            Some(existing) => SemanticContext::and(existing, predicates),
        });
        self
    }

    fn resolve_with_predicates(&mut self, state: StateId) -> &mut Self {
        self.state_mut(state).resolved_with_predicates = true;
        self
    }
}

/// Contract violations by whoever built the automaton. Always fatal for the decision.
#[derive(PartialEq, Clone, Debug)]
pub enum MalformedError {
    AcceptWithoutAlt(StateId),
    AltWithoutAccept(StateId, Alt),
    MultipleEot(StateId),
    NoDiscriminator(StateId),
    MissingState(StateId),
}

impl MalformedError {
    pub fn state(&self) -> StateId {
        match *self {
            MalformedError::AcceptWithoutAlt(state)
            | MalformedError::AltWithoutAccept(state, _)
            | MalformedError::MultipleEot(state)
            | MalformedError::NoDiscriminator(state)
            | MalformedError::MissingState(state) => state,
        }
    }
}

impl fmt::Display for MalformedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MalformedError::AcceptWithoutAlt(state) => write!(
                f,
                "State s{} is accepting but predicts no alternative",
                state
            ),
            MalformedError::AltWithoutAccept(state, alt) => write!(
                f,
                "State s{} predicts alternative {} but is not accepting",
                state, alt
            ),
            MalformedError::MultipleEot(state) => {
                write!(f, "State s{} has more than one EOT transition", state)
            }
            MalformedError::NoDiscriminator(state) => write!(
                f,
                "Decision state s{} has no discriminating transitions",
                state
            ),
            MalformedError::MissingState(state) => {
                write!(f, "State s{} does not exist", state)
            }
        }
    }
}

impl error::Error for MalformedError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[derive(Debug)]
pub enum DfaError {
    BuildErr(String),
}

impl fmt::Display for DfaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DfaError::BuildErr(ref err) => write!(f, "Failed to build DFA: {}", err),
        }
    }
}

impl error::Error for DfaError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
