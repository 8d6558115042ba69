use crate::core::{
    dfa::{MalformedError, StateId, Transition},
    gen::{guard::GuardBuilder, DefaultClause, Edge, SynthesisError, Synthesizer, Test},
};

impl<'s, 'c: 's, G: GuardBuilder> Synthesizer<'s, 'c, G> {
    /// Turns the EOT transition of decision state `state` into its default clause.
    ///
    /// An accepting EOT target predicts its alternative outright. Otherwise the
    /// target must branch on semantic predicates only, and those predicates are
    /// hoisted into the default clause of `state`.
    pub(super) fn resolve_eot(
        &mut self,
        state: StateId,
        eot: Option<&'s Transition>,
        k: usize,
    ) -> Result<Option<DefaultClause<G::Expr>>, SynthesisError> {
        let eot = match eot {
            Some(eot) => eot,
            None => return Ok(None),
        };

        let dfa = self.dfa;
        let target = dfa.view(eot.target())?;

        if target.is_accepting() {
            return match target.predicted_alt() {
                Some(alt) => Ok(Some(DefaultClause::Predicts(alt))),
                None => Err(MalformedError::AcceptWithoutAlt(target.id()).into()),
            };
        }

        if target.transitions().is_empty() {
            return Err(MalformedError::NoDiscriminator(target.id()).into());
        }

        if let Some(transition) = target
            .transitions()
            .iter()
            .find(|transition| !transition.label().is_semantic_predicate())
        {
            return Err(SynthesisError::EotErr {
                state,
                eot_target: target.id(),
                label: transition.label().to_string(),
            });
        }

        debug!(
            "Hoisting {} predicate(s) from EOT target s{} into s{}",
            target.transitions().len(),
            target.id(),
            state
        );

        let guards = self.collaborators.guards;
        let mut edges = Vec::with_capacity(target.transitions().len());
        for transition in target.transitions() {
            let test = Test::Expr(guards.predicate_guard(transition));
            let child = self.walk(transition.target(), k + 1)?;
            edges.push(Edge {
                test,
                predicate: None,
                target: child,
            });
        }

        Ok(Some(DefaultClause::Predicated {
            origin: target.id(),
            edges,
        }))
    }
}
