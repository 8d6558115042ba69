use {
    crate::core::{
        dfa::{
            label::{Label, EOF, EOT, MIN_TOKEN_TYPE},
            predicate::SemanticContext,
            Dfa, Transition,
        },
        util::{encoder::Encoder, string_utils},
    },
    std::{char, fmt},
};

/// Maps input values to the identifiers used by generated code.
pub trait TokenNamer: Send + Sync {
    fn name_of(&self, value: i32) -> String;
}

/// Builds the opaque guard handles threaded through the decision tree.
pub trait GuardBuilder: Send + Sync {
    type Expr: Clone + PartialEq + fmt::Debug;

    fn label_guard(&self, transition: &Transition, k: usize) -> Self::Expr;
    fn predicate_guard(&self, transition: &Transition) -> Self::Expr;
    fn render_predicate(&self, context: &SemanticContext, dfa: &Dfa) -> Self::Expr;
}

pub struct Vocabulary {
    tokens: Encoder<String>,
    char_literals: bool,
}

impl Vocabulary {
    pub fn new() -> Self {
        Vocabulary {
            tokens: Encoder::new(),
            char_literals: false,
        }
    }

    /// Vocabulary for lexer decisions, where values are character codes.
    pub fn chars() -> Self {
        Vocabulary {
            tokens: Encoder::new(),
            char_literals: true,
        }
    }

    pub fn define(&mut self, name: &str) -> i32 {
        self.tokens.encode(&name.to_string()) as i32 + MIN_TOKEN_TYPE
    }

    pub fn token_type(&self, name: &str) -> Option<i32> {
        match name {
            "EOF" => Some(EOF),
            "EOT" => Some(EOT),
            _ => self
                .tokens
                .lookup(&name.to_string())
                .map(|cipher| cipher as i32 + MIN_TOKEN_TYPE),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary::new()
    }
}

impl TokenNamer for Vocabulary {
    fn name_of(&self, value: i32) -> String {
        match value {
            EOF => "EOF".to_string(),
            EOT => "EOT".to_string(),
            _ if self.char_literals && value >= 0 => match char::from_u32(value as u32) {
                Some(c) => format!("'{}'", string_utils::escape_char(c)),
                None => value.to_string(),
            },
            _ if value >= MIN_TOKEN_TYPE => {
                match self.tokens.decode((value - MIN_TOKEN_TYPE) as usize) {
                    Some(name) => name.clone(),
                    None => value.to_string(),
                }
            }
            _ => value.to_string(),
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum GuardExpr {
    Equals { k: usize, value: String },
    Range { k: usize, lo: String, hi: String },
    Predicate(String),
    And(Vec<GuardExpr>),
    Or(Vec<GuardExpr>),
    Not(Box<GuardExpr>),
}

impl GuardExpr {
    /// Conjunction of a lookahead test and a gating predicate.
    pub fn guarded(test: GuardExpr, predicate: GuardExpr) -> GuardExpr {
        let mut operands = Vec::new();
        for operand in vec![test, predicate] {
            match operand {
                GuardExpr::And(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        GuardExpr::And(operands)
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GuardExpr::Predicate(text) => write!(f, "({})", text),
            GuardExpr::And(_) | GuardExpr::Or(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for GuardExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GuardExpr::Equals { k, value } => write!(f, "input.la({}) == {}", k, value),
            GuardExpr::Range { k, lo, hi } => write!(
                f,
                "(input.la({}) >= {} && input.la({}) <= {})",
                k, lo, k, hi
            ),
            GuardExpr::Predicate(text) => write!(f, "{}", text),
            GuardExpr::And(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " && ")?;
                    }
                    operand.fmt_operand(f)?;
                }
                Ok(())
            }
            GuardExpr::Or(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    match operand {
                        GuardExpr::Predicate(_) | GuardExpr::And(_) => operand.fmt_operand(f)?,
                        _ => write!(f, "{}", operand)?,
                    }
                }
                Ok(())
            }
            GuardExpr::Not(operand) => {
                write!(f, "!")?;
                match **operand {
                    GuardExpr::Equals { .. } => write!(f, "({})", operand),
                    _ => operand.fmt_operand(f),
                }
            }
        }
    }
}

/// Default guard builder: `input.la(k)` comparisons against named values.
pub struct LookaheadGuards<'namer> {
    namer: &'namer dyn TokenNamer,
}

impl<'namer> LookaheadGuards<'namer> {
    pub fn new(namer: &'namer dyn TokenNamer) -> Self {
        LookaheadGuards { namer }
    }

    fn context_expr(&self, context: &SemanticContext) -> GuardExpr {
        match context {
            SemanticContext::Predicate(text) => GuardExpr::Predicate(text.clone()),
            SemanticContext::And(operands) => GuardExpr::And(
                operands.iter().map(|op| self.context_expr(op)).collect(),
            ),
            SemanticContext::Or(operands) => GuardExpr::Or(
                operands.iter().map(|op| self.context_expr(op)).collect(),
            ),
            SemanticContext::Not(operand) => {
                GuardExpr::Not(Box::new(self.context_expr(operand)))
            }
        }
    }
}

impl<'namer> GuardBuilder for LookaheadGuards<'namer> {
    type Expr = GuardExpr;

    fn label_guard(&self, transition: &Transition, k: usize) -> GuardExpr {
        let label = transition.label();
        if let Some(context) = label.semantic_context() {
            return self.context_expr(context);
        }

        let set = match label.value_set() {
            Some(set) => set,
            None => {
                return GuardExpr::Equals {
                    k,
                    value: self.namer.name_of(EOT),
                }
            }
        };

        let mut tests: Vec<GuardExpr> = set
            .intervals()
            .iter()
            .map(|interval| {
                if interval.lo == interval.hi {
                    GuardExpr::Equals {
                        k,
                        value: self.namer.name_of(interval.lo),
                    }
                } else {
                    GuardExpr::Range {
                        k,
                        lo: self.namer.name_of(interval.lo),
                        hi: self.namer.name_of(interval.hi),
                    }
                }
            })
            .collect();

        if tests.len() == 1 {
            tests.remove(0)
        } else {
            GuardExpr::Or(tests)
        }
    }

    fn predicate_guard(&self, transition: &Transition) -> GuardExpr {
        match transition.label() {
            Label::Predicate(context) => self.context_expr(context),
            label => GuardExpr::Predicate(format!("{}", label)),
        }
    }

    fn render_predicate(&self, context: &SemanticContext, _dfa: &Dfa) -> GuardExpr {
        self.context_expr(context)
    }
}
