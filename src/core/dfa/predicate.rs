use std::fmt;

/// Semantic condition gating configurations; combined the way the analysis
/// that produced the automaton combined them.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum SemanticContext {
    Predicate(String),
    And(Vec<SemanticContext>),
    Or(Vec<SemanticContext>),
    Not(Box<SemanticContext>),
}

impl SemanticContext {
    pub fn predicate(text: &str) -> Self {
        SemanticContext::Predicate(text.to_string())
    }

    pub fn and(left: SemanticContext, right: SemanticContext) -> Self {
        let mut operands = Vec::new();
        for operand in vec![left, right] {
            match operand {
                SemanticContext::And(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        SemanticContext::And(operands)
    }

    pub fn or(left: SemanticContext, right: SemanticContext) -> Self {
        let mut operands = Vec::new();
        for operand in vec![left, right] {
            match operand {
                SemanticContext::Or(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        SemanticContext::Or(operands)
    }

    pub fn not(operand: SemanticContext) -> Self {
        match operand {
            SemanticContext::Not(inner) => *inner,
            other => SemanticContext::Not(Box::new(other)),
        }
    }
}

impl fmt::Display for SemanticContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemanticContext::Predicate(text) => write!(f, "{}", text),
            SemanticContext::And(operands) => write_joined(f, operands, "&&"),
            SemanticContext::Or(operands) => write_joined(f, operands, "||"),
            SemanticContext::Not(operand) => write!(f, "!({})", operand),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter,
    operands: &[SemanticContext],
    operator: &str,
) -> fmt::Result {
    let parts: Vec<String> = operands.iter().map(|op| format!("({})", op)).collect();
    write!(f, "{}", parts.join(operator))
}
