use {
    crate::core::{
        dfa::{Dfa, DfaError},
        gen::{
            config::{ConfigError, SynthesisConfig},
            guard::Vocabulary,
        },
    },
    std::{error, fmt},
    yaml_rust::ScanError,
};

mod load;

/// A grammar's worth of lookahead automata, as read from a description file.
pub struct DecisionSet {
    pub name: Option<String>,
    pub vocabulary: Vocabulary,
    pub config: SynthesisConfig,
    pub decisions: Vec<Dfa>,
}

impl DecisionSet {
    pub fn decision(&self, number: usize) -> Option<&Dfa> {
        self.decisions.iter().find(|dfa| dfa.decision() == number)
    }
}

pub fn load_description(input: &str) -> Result<DecisionSet, Error> {
    load::load_description(input)
}

#[derive(Debug)]
pub enum Error {
    YamlErr(ScanError),
    StructureErr(String),
    UndefinedTokenErr(String),
    ConfigErr(ConfigError),
    DfaErr { decision: usize, err: DfaError },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::YamlErr(ref err) => write!(f, "Malformed YAML: {}", err),
            Error::StructureErr(ref err) => write!(f, "Invalid description: {}", err),
            Error::UndefinedTokenErr(ref token) => {
                write!(f, "Token '{}' is used but never defined", token)
            }
            Error::ConfigErr(ref err) => write!(f, "Invalid options: {}", err),
            Error::DfaErr { decision, ref err } => {
                write!(f, "Decision {} is invalid: {}", decision, err)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::YamlErr(ref err) => Some(err),
            Error::StructureErr(_) => None,
            Error::UndefinedTokenErr(_) => None,
            Error::ConfigErr(ref err) => Some(err),
            Error::DfaErr { ref err, .. } => Some(err),
        }
    }
}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Error {
        Error::YamlErr(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Error {
        Error::ConfigErr(err)
    }
}
