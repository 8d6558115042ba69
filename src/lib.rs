#[macro_use]
extern crate log;

use {
    crate::core::{
        desc::{self, DecisionSet},
        dfa::Dfa,
        gen::{
            self,
            config::SynthesisConfig,
            guard::{GuardExpr, LookaheadGuards, Vocabulary},
            oracle::CaseLimitOracle,
            Collaborators, Node, SynthesisError,
        },
        render::Renderer,
        util::thread_pool::{self, ThreadPool},
    },
    regex::Regex,
    std::{
        error, fmt,
        panic::{self, AssertUnwindSafe},
        sync::{Arc, Mutex},
    },
};

pub mod core;

const THREAD_POOL_QUEUE_LENGTH_PER_WORKER: usize = 2;

/// Rendered prediction code for one decision.
#[derive(PartialEq, Clone, Debug)]
pub struct Generated {
    pub decision: usize,
    pub description: String,
    pub code: String,
}

pub struct GenerationJobRunner {
    decision_set: Arc<DecisionSet>,
    config: Arc<SynthesisConfig>,
}

impl GenerationJobRunner {
    pub fn build(description: &str) -> Result<GenerationJobRunner, BuildError> {
        let decision_set = desc::load_description(description)?;
        let config = decision_set.config.clone();

        info!(
            "Loaded {} decision(s) over {} token(s) for grammar {}",
            decision_set.decisions.len(),
            decision_set.vocabulary.len(),
            decision_set.name.as_ref().map_or("<unnamed>", |name| &name[..])
        );

        Ok(GenerationJobRunner {
            decision_set: Arc::new(decision_set),
            config: Arc::new(config),
        })
    }

    /// Replaces the options read from the description.
    pub fn with_config(mut self, config: SynthesisConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn name(&self) -> Option<&str> {
        self.decision_set.name.as_ref().map(|name| &name[..])
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.decision_set.vocabulary
    }

    pub fn decisions(&self) -> &[Dfa] {
        &self.decision_set.decisions
    }

    pub fn synthesize(&self, number: usize) -> Result<Node<GuardExpr>, GenerateError> {
        match self.decision_set.decision(number) {
            Some(dfa) => synthesize_decision(&self.decision_set, &self.config, dfa),
            None => Err(GenerateError::UnknownDecisionErr(number)),
        }
    }

    pub fn generate(&self) -> Result<Vec<Generated>, GenerateError> {
        self.decisions()
            .iter()
            .map(|dfa| generate_decision(&self.decision_set, &self.config, dfa))
            .collect()
    }

    /// Renders decisions whose description matches `pattern`.
    pub fn generate_matching(&self, pattern: &str) -> Result<Vec<Generated>, GenerateError> {
        let regex = Regex::new(pattern)?;
        self.decisions()
            .iter()
            .filter(|dfa| regex.is_match(dfa.description()))
            .map(|dfa| generate_decision(&self.decision_set, &self.config, dfa))
            .collect()
    }

    /// Same results as `generate`, with decisions synthesized on `threads` workers.
    /// The first failure in decision order is reported.
    pub fn generate_parallel(&self, threads: usize) -> Result<Vec<Generated>, GenerateError> {
        let indices: Vec<usize> = (0..self.decisions().len()).collect();
        self.generate_indices(indices, threads)
    }

    pub fn generate_parallel_matching(
        &self,
        pattern: &str,
        threads: usize,
    ) -> Result<Vec<Generated>, GenerateError> {
        let regex = Regex::new(pattern)?;
        let indices: Vec<usize> = self
            .decisions()
            .iter()
            .enumerate()
            .filter(|(_, dfa)| regex.is_match(dfa.description()))
            .map(|(index, _)| index)
            .collect();
        self.generate_indices(indices, threads)
    }

    fn generate_indices(
        &self,
        indices: Vec<usize>,
        threads: usize,
    ) -> Result<Vec<Generated>, GenerateError> {
        let slots: Arc<Mutex<Vec<Option<Result<Generated, GenerateError>>>>> =
            Arc::new(Mutex::new((0..indices.len()).map(|_| None).collect()));

        let decision_set = self.decision_set.clone();
        let config = self.config.clone();
        let slots_clone = slots.clone();

        let pool = ThreadPool::spawn(
            threads,
            threads.max(1) * THREAD_POOL_QUEUE_LENGTH_PER_WORKER,
            move |(slot, index): (usize, usize)| {
                let dfa = &decision_set.decisions[index];
                let res = match panic::catch_unwind(AssertUnwindSafe(|| {
                    generate_decision(&decision_set, &config, dfa)
                })) {
                    Ok(res) => res,
                    Err(cause) => Err(GenerateError::JobErr {
                        decision: dfa.decision(),
                        cause: thread_pool::panic_message(&*cause),
                    }),
                };
                match slots_clone.lock() {
                    Ok(mut slots) => slots[slot] = Some(res),
                    Err(err) => error!("Failed to store result of decision job: {}", err),
                }
            },
        );

        for (slot, index) in indices.iter().enumerate() {
            pool.enqueue((slot, *index));
        }
        pool.terminate_and_join();

        let mut slots = match slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut res = Vec::with_capacity(indices.len());
        for (slot, index) in indices.iter().enumerate() {
            match slots[slot].take() {
                Some(generated) => res.push(generated?),
                None => {
                    return Err(GenerateError::JobErr {
                        decision: self.decision_set.decisions[*index].decision(),
                        cause: "no result was reported".to_string(),
                    })
                }
            }
        }
        Ok(res)
    }
}

fn synthesize_decision(
    decision_set: &DecisionSet,
    config: &SynthesisConfig,
    dfa: &Dfa,
) -> Result<Node<GuardExpr>, GenerateError> {
    let oracle = CaseLimitOracle::from_config(config);
    let guards = LookaheadGuards::new(&decision_set.vocabulary);
    let collaborators = Collaborators {
        oracle: &oracle,
        namer: &decision_set.vocabulary,
        guards: &guards,
        config,
    };

    gen::synthesize(dfa, &collaborators).map_err(|err| GenerateError::SynthesisErr {
        decision: dfa.decision(),
        err,
    })
}

fn generate_decision(
    decision_set: &DecisionSet,
    config: &SynthesisConfig,
    dfa: &Dfa,
) -> Result<Generated, GenerateError> {
    let tree = synthesize_decision(decision_set, config, dfa)?;
    Ok(Generated {
        decision: dfa.decision(),
        description: dfa.description().to_string(),
        code: Renderer::new().render(dfa, &tree),
    })
}

#[derive(Debug)]
pub enum BuildError {
    DescriptionErr(desc::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::DescriptionErr(ref err) => {
                write!(f, "Failed to load description: {}", err)
            }
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            BuildError::DescriptionErr(ref err) => Some(err),
        }
    }
}

impl From<desc::Error> for BuildError {
    fn from(err: desc::Error) -> BuildError {
        BuildError::DescriptionErr(err)
    }
}

#[derive(Debug)]
pub enum GenerateError {
    SynthesisErr {
        decision: usize,
        err: SynthesisError,
    },
    UnknownDecisionErr(usize),
    PatternErr(regex::Error),
    JobErr {
        decision: usize,
        cause: String,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GenerateError::SynthesisErr { decision, ref err } => {
                write!(f, "Failed to synthesize decision {}: {}", decision, err)
            }
            GenerateError::UnknownDecisionErr(decision) => {
                write!(f, "Decision {} is not described", decision)
            }
            GenerateError::PatternErr(ref err) => {
                write!(f, "Failed to build decision pattern: {}", err)
            }
            GenerateError::JobErr {
                decision,
                ref cause,
            } => write!(
                f,
                "Generation job for decision {} did not complete: {}",
                decision, cause
            ),
        }
    }
}

impl error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            GenerateError::SynthesisErr { ref err, .. } => Some(err),
            GenerateError::UnknownDecisionErr(_) => None,
            GenerateError::PatternErr(ref err) => Some(err),
            GenerateError::JobErr { .. } => None,
        }
    }
}

impl From<regex::Error> for GenerateError {
    fn from(err: regex::Error) -> GenerateError {
        GenerateError::PatternErr(err)
    }
}
