use crate::core::{
    dfa::{Alt, Dfa, StateId},
    gen::{
        guard::GuardExpr, Decision, DefaultClause, Edge, Family, Node, NodeKind, Test,
    },
    util::string_utils,
};

/// Renders synthesized decision trees as Rust-flavoured prediction code.
pub struct Renderer {
    header: bool,
}

impl Renderer {
    pub fn new() -> Renderer {
        Renderer { header: true }
    }

    /// Renderer that omits the leading `// decision` comment.
    pub fn bare() -> Renderer {
        Renderer { header: false }
    }

    pub fn render(&self, dfa: &Dfa, node: &Node<GuardExpr>) -> String {
        let mut render_job = RenderJob {
            decision: dfa.decision(),
            lines: Vec::new(),
            open_marks: 0,
        };

        if self.header {
            if dfa.description().is_empty() {
                render_job.emit(0, &format!("// decision {}", dfa.decision()));
            } else {
                render_job.emit(
                    0,
                    &format!("// decision {}: {}", dfa.decision(), dfa.description()),
                );
            }
        }

        render_job.node(node, 0);

        let mut res = render_job.lines.join("\n");
        res.push('\n');
        res
    }
}

impl Default for Renderer {
    fn default() -> Renderer {
        Renderer::new()
    }
}

enum Otherwise {
    Predict(Alt),
    Fail,
}

struct RenderJob {
    decision: usize,
    lines: Vec<String>,
    /// Enclosing decisions that marked the input and must rewind before returning.
    open_marks: usize,
}

impl RenderJob {
    fn emit(&mut self, depth: usize, text: &str) {
        self.lines
            .push(format!("{}{}", string_utils::indent(depth), text));
    }

    fn node(&mut self, node: &Node<GuardExpr>, depth: usize) {
        match node {
            Node::Accept(alt) => self.emit(depth, &format!("alt = {};", alt)),
            Node::Decision(decision) => {
                if decision.sem_pred_state {
                    self.emit(depth, "let mark = input.mark();");
                    self.open_marks += 1;
                }

                match decision.family {
                    Family::Switch => self.switch(decision, depth),
                    Family::Chain => self.chain_decision(decision, depth),
                }

                if decision.sem_pred_state {
                    self.open_marks -= 1;
                    self.emit(depth, "input.rewind(mark);");
                }
            }
        }
    }

    fn switch(&mut self, decision: &Decision<GuardExpr>, depth: usize) {
        self.emit(depth, &format!("match input.la({}) {{", decision.k));

        for edge in &decision.edges {
            let (pattern, guard) = match edge.test {
                Test::Values(ref values) => (values.join(" | "), edge.predicate.clone()),
                Test::Expr(ref expr) => ("_".to_string(), Some(guard_of(expr.clone(), edge))),
            };

            match guard {
                Some(guard) => self.emit(depth + 1, &format!("{} if {} => {{", pattern, guard)),
                None => self.emit(depth + 1, &format!("{} => {{", pattern)),
            }
            self.node(&edge.target, depth + 2);
            self.emit(depth + 1, "}");
        }

        match decision.default {
            Some(DefaultClause::Predicts(alt)) => {
                self.emit(depth + 1, "_ => {");
                self.otherwise(Otherwise::Predict(alt), decision.state, depth + 2);
                self.emit(depth + 1, "}");
            }
            Some(DefaultClause::Predicated { ref edges, .. }) => {
                self.emit(depth + 1, "_ => {");
                let branches = edges
                    .iter()
                    .map(|edge| (edge_guard(edge, decision.k), &edge.target))
                    .collect();
                self.chain(branches, Some(Otherwise::Fail), decision.state, depth + 2);
                self.emit(depth + 1, "}");
            }
            None => match decision.kind {
                NodeKind::Plain => {
                    self.emit(depth + 1, "_ => {");
                    self.otherwise(Otherwise::Fail, decision.state, depth + 2);
                    self.emit(depth + 1, "}");
                }
                NodeKind::LoopBack | NodeKind::OptionalBlockStart => {
                    self.emit(depth + 1, "_ => {}")
                }
            },
        }

        self.emit(depth, "}");
    }

    fn chain_decision(&mut self, decision: &Decision<GuardExpr>, depth: usize) {
        let mut branches: Vec<(GuardExpr, &Node<GuardExpr>)> = decision
            .edges
            .iter()
            .map(|edge| (edge_guard(edge, decision.k), &edge.target))
            .collect();

        let otherwise = match decision.default {
            Some(DefaultClause::Predicts(alt)) => Some(Otherwise::Predict(alt)),
            Some(DefaultClause::Predicated { ref edges, .. }) => {
                branches.extend(
                    edges
                        .iter()
                        .map(|edge| (edge_guard(edge, decision.k), &edge.target)),
                );
                Some(Otherwise::Fail)
            }
            None => match decision.kind {
                NodeKind::Plain => Some(Otherwise::Fail),
                NodeKind::LoopBack | NodeKind::OptionalBlockStart => None,
            },
        };

        self.chain(branches, otherwise, decision.state, depth);
    }

    fn chain(
        &mut self,
        branches: Vec<(GuardExpr, &Node<GuardExpr>)>,
        otherwise: Option<Otherwise>,
        state: StateId,
        depth: usize,
    ) {
        if branches.is_empty() {
            if let Some(otherwise) = otherwise {
                self.otherwise(otherwise, state, depth);
            }
            return;
        }

        for (i, (guard, target)) in branches.into_iter().enumerate() {
            let opener = if i == 0 { "if" } else { "} else if" };
            self.emit(depth, &format!("{} {} {{", opener, guard));
            self.node(target, depth + 1);
        }

        if let Some(otherwise) = otherwise {
            self.emit(depth, "} else {");
            self.otherwise(otherwise, state, depth + 1);
        }
        self.emit(depth, "}");
    }

    fn otherwise(&mut self, otherwise: Otherwise, state: StateId, depth: usize) {
        match otherwise {
            Otherwise::Predict(alt) => self.emit(depth, &format!("alt = {};", alt)),
            Otherwise::Fail => {
                if self.open_marks > 0 {
                    self.emit(depth, "input.rewind(mark);");
                }
                self.emit(
                    depth,
                    &format!(
                        "return Err(no_viable_alt({}, {}));",
                        self.decision, state
                    ),
                )
            }
        }
    }
}

fn edge_guard(edge: &Edge<GuardExpr>, k: usize) -> GuardExpr {
    let test = match edge.test {
        Test::Values(ref values) => values_guard(values, k),
        Test::Expr(ref expr) => expr.clone(),
    };
    guard_of(test, edge)
}

fn guard_of(test: GuardExpr, edge: &Edge<GuardExpr>) -> GuardExpr {
    match edge.predicate {
        Some(ref predicate) => GuardExpr::guarded(test, predicate.clone()),
        None => test,
    }
}

fn values_guard(values: &[String], k: usize) -> GuardExpr {
    let mut tests: Vec<GuardExpr> = values
        .iter()
        .map(|value| GuardExpr::Equals {
            k,
            value: value.clone(),
        })
        .collect();

    if tests.len() == 1 {
        tests.remove(0)
    } else {
        GuardExpr::Or(tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dfa::{DecisionType, DfaBuilder, SimpleDfaBuilder};

    fn dfa(decision_type: DecisionType) -> Dfa {
        let mut builder = SimpleDfaBuilder::new();
        builder
            .decision(7, "a : ID | INT ;")
            .decision_type(decision_type)
            .mark_start(0);
        builder.build().unwrap()
    }

    fn equals(k: usize, value: &str) -> GuardExpr {
        GuardExpr::Equals {
            k,
            value: value.to_string(),
        }
    }

    fn decision(family: Family, kind: NodeKind, edges: Vec<Edge<GuardExpr>>) -> Decision<GuardExpr> {
        Decision {
            k: 1,
            state: 0,
            kind,
            family,
            sem_pred_state: false,
            edges,
            default: None,
        }
    }

    fn edge(test: Test<GuardExpr>, alt: Alt) -> Edge<GuardExpr> {
        Edge {
            test,
            predicate: None,
            target: Node::Accept(alt),
        }
    }

    #[test]
    fn render_switch() {
        //setup
        let node = Node::Decision(decision(
            Family::Switch,
            NodeKind::Plain,
            vec![
                edge(Test::Values(vec!["ID".to_string(), "INT".to_string()]), 1),
                edge(Test::Values(vec!["SEMI".to_string()]), 2),
            ],
        ));

        //exercise
        let res = Renderer::new().render(&dfa(DecisionType::Plain), &node);

        //verify
        assert_eq!(
            res,
            "// decision 7: a : ID | INT ;
match input.la(1) {
    ID | INT => {
        alt = 1;
    }
    SEMI => {
        alt = 2;
    }
    _ => {
        return Err(no_viable_alt(7, 0));
    }
}
"
        );
    }

    #[test]
    fn render_loopback_switch_falls_through() {
        //setup
        let node = Node::Decision(decision(
            Family::Switch,
            NodeKind::LoopBack,
            vec![edge(Test::Values(vec!["ID".to_string()]), 1)],
        ));

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::LoopBack), &node);

        //verify
        assert_eq!(
            res,
            "match input.la(1) {
    ID => {
        alt = 1;
    }
    _ => {}
}
"
        );
    }

    #[test]
    fn render_chain_with_predicate() {
        //setup
        let mut root = decision(
            Family::Chain,
            NodeKind::Plain,
            vec![
                edge(Test::Expr(equals(1, "ID")), 1),
                Edge {
                    test: Test::Expr(equals(1, "INT")),
                    predicate: Some(GuardExpr::Predicate("p".to_string())),
                    target: Node::Accept(2),
                },
            ],
        );
        root.default = Some(DefaultClause::Predicts(3));

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::Plain), &Node::Decision(root));

        //verify
        assert_eq!(
            res,
            "if input.la(1) == ID {
    alt = 1;
} else if input.la(1) == INT && (p) {
    alt = 2;
} else {
    alt = 3;
}
"
        );
    }

    #[test]
    fn render_optional_chain_without_default() {
        //setup
        let node = Node::Decision(decision(
            Family::Chain,
            NodeKind::OptionalBlockStart,
            vec![edge(Test::Values(vec!["ID".to_string(), "INT".to_string()]), 1)],
        ));

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::OptionalBlockStart), &node);

        //verify
        assert_eq!(
            res,
            "if input.la(1) == ID || input.la(1) == INT {
    alt = 1;
}
"
        );
    }

    #[test]
    fn render_hoisted_predicates() {
        //setup
        let mut root = decision(
            Family::Chain,
            NodeKind::Plain,
            vec![edge(Test::Expr(equals(1, "ID")), 1)],
        );
        root.sem_pred_state = true;
        root.default = Some(DefaultClause::Predicated {
            origin: 2,
            edges: vec![
                edge(Test::Expr(GuardExpr::Predicate("p".to_string())), 2),
                edge(Test::Expr(GuardExpr::Predicate("q".to_string())), 3),
            ],
        });

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::Plain), &Node::Decision(root));

        //verify
        assert_eq!(
            res,
            "let mark = input.mark();
if input.la(1) == ID {
    alt = 1;
} else if p {
    alt = 2;
} else if q {
    alt = 3;
} else {
    input.rewind(mark);
    return Err(no_viable_alt(7, 0));
}
input.rewind(mark);
"
        );
    }

    #[test]
    fn render_nested() {
        //setup
        let inner = Decision {
            k: 2,
            state: 1,
            kind: NodeKind::Plain,
            family: Family::Chain,
            sem_pred_state: false,
            edges: vec![edge(Test::Expr(equals(2, "SEMI")), 1)],
            default: Some(DefaultClause::Predicts(2)),
        };
        let root = decision(
            Family::Switch,
            NodeKind::Plain,
            vec![Edge {
                test: Test::Values(vec!["ID".to_string()]),
                predicate: None,
                target: Node::Decision(inner),
            }],
        );

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::Plain), &Node::Decision(root));

        //verify
        assert_eq!(
            res,
            "match input.la(1) {
    ID => {
        if input.la(2) == SEMI {
            alt = 1;
        } else {
            alt = 2;
        }
    }
    _ => {
        return Err(no_viable_alt(7, 0));
    }
}
"
        );
    }

    #[test]
    fn nested_failures_rewind_marked_input() {
        //setup
        let inner = Decision {
            k: 2,
            state: 1,
            kind: NodeKind::Plain,
            family: Family::Chain,
            sem_pred_state: false,
            edges: vec![edge(Test::Expr(equals(2, "SEMI")), 1)],
            default: None,
        };
        let mut root = decision(
            Family::Switch,
            NodeKind::Plain,
            vec![Edge {
                test: Test::Values(vec!["ID".to_string()]),
                predicate: None,
                target: Node::Decision(inner),
            }],
        );
        root.sem_pred_state = true;

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::Plain), &Node::Decision(root));

        //verify
        assert_eq!(
            res,
            "let mark = input.mark();
match input.la(1) {
    ID => {
        if input.la(2) == SEMI {
            alt = 1;
        } else {
            input.rewind(mark);
            return Err(no_viable_alt(7, 1));
        }
    }
    _ => {
        input.rewind(mark);
        return Err(no_viable_alt(7, 0));
    }
}
input.rewind(mark);
"
        );
    }

    #[test]
    fn render_eot_only_default() {
        //setup
        let mut root = decision(Family::Chain, NodeKind::Plain, vec![]);
        root.default = Some(DefaultClause::Predicts(4));

        //exercise
        let res = Renderer::bare().render(&dfa(DecisionType::Plain), &Node::Decision(root));

        //verify
        assert_eq!(res, "alt = 4;\n");
    }
}
