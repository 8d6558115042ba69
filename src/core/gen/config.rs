use {
    crate::core::gen::Family,
    std::{error, fmt, str::FromStr},
};

pub const DEF_MIN_SWITCH_ALTS: usize = 3;
pub const DEF_MAX_SWITCH_CASE_LABELS: usize = 300;

/// When value-set edges are materialized as explicit value lists instead of guards.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Enumeration {
    Never,
    Always,
    SwitchEdges,
}

impl Enumeration {
    pub fn wants_values(&self, family: Family) -> bool {
        match *self {
            Enumeration::Never => false,
            Enumeration::Always => true,
            Enumeration::SwitchEdges => family == Family::Switch,
        }
    }
}

impl FromStr for Enumeration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Enumeration::Never),
            "always" => Ok(Enumeration::Always),
            "switch" => Ok(Enumeration::SwitchEdges),
            _ => Err(ConfigError::ValueErr(
                "enumerate".to_string(),
                s.to_string(),
            )),
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct SynthesisConfig {
    pub generate_switches: bool,
    pub min_switch_alts: usize,
    pub max_switch_case_labels: usize,
    pub enumerate: Enumeration,
    pub max_depth: Option<usize>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            generate_switches: true,
            min_switch_alts: DEF_MIN_SWITCH_ALTS,
            max_switch_case_labels: DEF_MAX_SWITCH_CASE_LABELS,
            enumerate: Enumeration::SwitchEdges,
            max_depth: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ValueErr(String, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::ValueErr(ref option, ref value) => {
                write!(f, "Invalid value '{}' for option '{}'", value, option)
            }
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_policy() {
        //exercise/verify
        assert!(!Enumeration::Never.wants_values(Family::Switch));
        assert!(Enumeration::Always.wants_values(Family::Chain));
        assert!(Enumeration::SwitchEdges.wants_values(Family::Switch));
        assert!(!Enumeration::SwitchEdges.wants_values(Family::Chain));
    }

    #[test]
    fn parse_enumeration() {
        //exercise
        let res: Result<Enumeration, ConfigError> = "sometimes".parse();

        //verify
        assert_eq!("switch".parse::<Enumeration>().unwrap(), Enumeration::SwitchEdges);
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Invalid value 'sometimes' for option 'enumerate'"
        );
    }
}
