use {
    crate::core::{
        dfa::{Alt, DecisionType, Dfa, MalformedError, StateId, StateView, Transition},
        gen::{
            config::SynthesisConfig,
            guard::{GuardBuilder, TokenNamer},
            oracle::SwitchOracle,
        },
    },
    std::{collections::HashSet, error, fmt},
};

pub mod config;
mod eot;
pub mod guard;
pub mod oracle;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum NodeKind {
    Plain,
    LoopBack,
    OptionalBlockStart,
}

impl From<DecisionType> for NodeKind {
    fn from(decision_type: DecisionType) -> Self {
        match decision_type {
            DecisionType::Plain => NodeKind::Plain,
            DecisionType::LoopBack => NodeKind::LoopBack,
            DecisionType::OptionalBlockStart => NodeKind::OptionalBlockStart,
        }
    }
}

/// Textual family a renderer should use for a decision.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Family {
    Chain,
    Switch,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Node<Expr> {
    Accept(Alt),
    Decision(Decision<Expr>),
}

#[derive(PartialEq, Clone, Debug)]
pub struct Decision<Expr> {
    pub k: usize,
    pub state: StateId,
    pub kind: NodeKind,
    pub family: Family,
    pub sem_pred_state: bool,
    pub edges: Vec<Edge<Expr>>,
    pub default: Option<DefaultClause<Expr>>,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Test<Expr> {
    Values(Vec<String>),
    Expr(Expr),
}

#[derive(PartialEq, Clone, Debug)]
pub struct Edge<Expr> {
    pub test: Test<Expr>,
    pub predicate: Option<Expr>,
    pub target: Node<Expr>,
}

#[derive(PartialEq, Clone, Debug)]
pub enum DefaultClause<Expr> {
    Predicts(Alt),
    /// Predicates hoisted from the EOT target `origin`; failing all of them is a
    /// no-viable-alternative error.
    Predicated {
        origin: StateId,
        edges: Vec<Edge<Expr>>,
    },
}

/// Everything the synthesizer consults besides the automaton itself.
pub struct Collaborators<'c, G: GuardBuilder> {
    pub oracle: &'c dyn SwitchOracle,
    pub namer: &'c dyn TokenNamer,
    pub guards: &'c G,
    pub config: &'c SynthesisConfig,
}

/// Converts an acyclic lookahead automaton into a decision tree rooted at its start
/// state. Fails without a partial result on any malformed state.
pub fn synthesize<G: GuardBuilder>(
    dfa: &Dfa,
    collaborators: &Collaborators<G>,
) -> Result<Node<G::Expr>, SynthesisError> {
    debug!(
        "Synthesizing decision {} ({} states)",
        dfa.decision(),
        dfa.state_count()
    );

    let mut synthesizer = Synthesizer {
        dfa,
        collaborators,
        path: HashSet::new(),
        visits: 0,
    };

    let root = synthesizer.walk(dfa.start(), 1)?;

    debug!(
        "Synthesized decision {} after {} state visits",
        dfa.decision(),
        synthesizer.visits
    );
    Ok(root)
}

struct Synthesizer<'s, 'c: 's, G: GuardBuilder> {
    dfa: &'s Dfa,
    collaborators: &'s Collaborators<'c, G>,
    path: HashSet<StateId>,
    visits: usize,
}

impl<'s, 'c: 's, G: GuardBuilder> Synthesizer<'s, 'c, G> {
    fn walk(&mut self, id: StateId, k: usize) -> Result<Node<G::Expr>, SynthesisError> {
        let dfa = self.dfa;
        let view = dfa.view(id)?;
        self.visits += 1;
        trace!("Visiting s{} at k={}", id, k);

        if view.is_accepting() {
            return match view.predicted_alt() {
                Some(alt) => Ok(Node::Accept(alt)),
                None => Err(MalformedError::AcceptWithoutAlt(id).into()),
            };
        }

        if let Some(limit) = self.collaborators.config.max_depth {
            if k > limit {
                return Err(SynthesisError::DepthErr { state: id, limit });
            }
        }

        if !self.path.insert(id) {
            return Err(SynthesisError::CycleErr(id));
        }

        let res = self.decision(&view, k);
        self.path.remove(&id);
        Ok(Node::Decision(res?))
    }

    fn decision(
        &mut self,
        view: &StateView<'s>,
        k: usize,
    ) -> Result<Decision<G::Expr>, SynthesisError> {
        let eot = view.eot_transition();
        if eot.is_none() && view.discriminating_transitions().next().is_none() {
            return Err(MalformedError::NoDiscriminator(view.id()).into());
        }

        let family = if self
            .collaborators
            .oracle
            .can_switch(self.dfa, view.state())
        {
            Family::Switch
        } else {
            Family::Chain
        };

        let mut edges = Vec::new();
        for transition in view.discriminating_transitions() {
            edges.push(self.edge(transition, family, k)?);
        }

        let default = self.resolve_eot(view.id(), eot, k)?;

        Ok(Decision {
            k,
            state: view.id(),
            kind: NodeKind::from(view.decision_type()),
            family,
            sem_pred_state: view.is_resolved_with_predicates(),
            edges,
            default,
        })
    }

    fn edge(
        &mut self,
        transition: &'s Transition,
        family: Family,
        k: usize,
    ) -> Result<Edge<G::Expr>, SynthesisError> {
        let label = transition.label();
        let dfa = self.dfa;
        let collaborators = self.collaborators;

        let test = match label.value_set() {
            Some(ref values)
                if collaborators.config.enumerate.wants_values(family)
                    && values.size() <= collaborators.config.max_switch_case_labels =>
            {
                Test::Values(
                    values
                        .to_list()
                        .into_iter()
                        .map(|value| collaborators.namer.name_of(value))
                        .collect(),
                )
            }
            _ => Test::Expr(collaborators.guards.label_guard(transition, k)),
        };

        let predicate = if label.is_semantic_predicate() {
            None
        } else {
            dfa.view(transition.target())?
                .gated_predicates()
                .map(|context| collaborators.guards.render_predicate(context, dfa))
        };

        let target = self.walk(transition.target(), k + 1)?;

        Ok(Edge {
            test,
            predicate,
            target,
        })
    }
}

impl<Expr: fmt::Display> Node<Expr> {
    /// Human readable dump of the tree, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut res = String::new();
        TreeItem::Node(self).write(&mut res, String::new(), true);
        res
    }
}

enum TreeItem<'n, Expr> {
    Node(&'n Node<Expr>),
    Edge(&'n Edge<Expr>),
    Default(&'n DefaultClause<Expr>),
}

impl<'n, Expr: fmt::Display> TreeItem<'n, Expr> {
    fn write(&self, out: &mut String, prefix: String, is_tail: bool) {
        out.push_str(&format!(
            "{}{}{}\n",
            prefix,
            if is_tail { "└── " } else { "├── " },
            self.label()
        ));

        let children = self.children();
        let len = children.len();
        for (i, child) in children.iter().enumerate() {
            child.write(
                out,
                format!("{}{}", prefix, if is_tail { "    " } else { "│   " }),
                i == len - 1,
            );
        }
    }

    fn label(&self) -> String {
        match self {
            TreeItem::Node(Node::Accept(alt)) => format!("alt {}", alt),
            TreeItem::Node(Node::Decision(decision)) => format!(
                "s{} k={} {:?}/{:?}{}",
                decision.state,
                decision.k,
                decision.kind,
                decision.family,
                if decision.sem_pred_state { " sempred" } else { "" }
            ),
            TreeItem::Edge(edge) => {
                let test = match edge.test {
                    Test::Values(ref values) => values.join(" | "),
                    Test::Expr(ref expr) => expr.to_string(),
                };
                match edge.predicate {
                    Some(ref predicate) => format!("{} [{}]", test, predicate),
                    None => test,
                }
            }
            TreeItem::Default(DefaultClause::Predicts(alt)) => format!("default -> alt {}", alt),
            TreeItem::Default(DefaultClause::Predicated { origin, .. }) => {
                format!("default (hoisted from s{})", origin)
            }
        }
    }

    fn children(&self) -> Vec<TreeItem<'n, Expr>> {
        match *self {
            TreeItem::Node(Node::Accept(_)) => vec![],
            TreeItem::Node(Node::Decision(decision)) => {
                let mut children: Vec<TreeItem<'n, Expr>> =
                    decision.edges.iter().map(TreeItem::Edge).collect();
                if let Some(ref default) = decision.default {
                    children.push(TreeItem::Default(default));
                }
                children
            }
            TreeItem::Edge(edge) => vec![TreeItem::Node(&edge.target)],
            TreeItem::Default(DefaultClause::Predicts(_)) => vec![],
            TreeItem::Default(DefaultClause::Predicated { edges, .. }) => {
                edges.iter().map(TreeItem::Edge).collect()
            }
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum SynthesisError {
    MalformedErr(MalformedError),
    EotErr {
        state: StateId,
        eot_target: StateId,
        label: String,
    },
    CycleErr(StateId),
    DepthErr {
        state: StateId,
        limit: usize,
    },
}

impl SynthesisError {
    /// The state the diagnostic refers to.
    pub fn state(&self) -> StateId {
        match *self {
            SynthesisError::MalformedErr(ref err) => err.state(),
            SynthesisError::EotErr { state, .. } => state,
            SynthesisError::CycleErr(state) => state,
            SynthesisError::DepthErr { state, .. } => state,
        }
    }
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SynthesisError::MalformedErr(ref err) => write!(f, "Malformed automaton: {}", err),
            SynthesisError::EotErr {
                state,
                eot_target,
                ref label,
            } => write!(
                f,
                "EOT target s{} of state s{} branches on non-predicate label {}",
                eot_target, state, label
            ),
            SynthesisError::CycleErr(state) => write!(
                f,
                "State s{} was revisited on the current path, automaton is cyclic",
                state
            ),
            SynthesisError::DepthErr { state, limit } => write!(
                f,
                "Lookahead depth limit {} exceeded at state s{}",
                limit, state
            ),
        }
    }
}

impl error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            SynthesisError::MalformedErr(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<MalformedError> for SynthesisError {
    fn from(err: MalformedError) -> SynthesisError {
        SynthesisError::MalformedErr(err)
    }
}
