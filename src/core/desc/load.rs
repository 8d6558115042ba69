use {
    crate::core::{
        desc::{DecisionSet, Error},
        dfa::{
            label::{IntervalSet, Label, EOT},
            predicate::SemanticContext,
            DecisionType, Dfa, DfaBuilder, SimpleDfaBuilder,
        },
        gen::{
            config::{Enumeration, SynthesisConfig},
            guard::Vocabulary,
        },
        util::string_utils,
    },
    std::{collections::HashSet, convert::TryFrom},
    yaml_rust::{Yaml, YamlLoader},
};

pub fn load_description(input: &str) -> Result<DecisionSet, Error> {
    let docs = YamlLoader::load_from_str(input)?;
    let doc = match docs.first() {
        Some(doc) => doc,
        None => return Err(Error::StructureErr("Description is empty".to_string())),
    };

    let name = optional_str(&doc["grammar"], "grammar")?.map(|name| name.to_string());

    let mut vocabulary = if optional_bool(&doc["chars"], "chars")?.unwrap_or(false) {
        Vocabulary::chars()
    } else {
        Vocabulary::new()
    };

    for token in list(&doc["tokens"], "tokens")? {
        match token.as_str() {
            Some(token) => {
                vocabulary.define(token);
            }
            None => {
                return Err(Error::StructureErr(
                    "Token names must be strings".to_string(),
                ))
            }
        }
    }

    let config = load_options(&doc["options"])?;

    let mut numbers: HashSet<usize> = HashSet::new();
    let mut decisions: Vec<Dfa> = Vec::new();
    for decision in list(&doc["decisions"], "decisions")? {
        let dfa = load_decision(decision, &vocabulary)?;
        if !numbers.insert(dfa.decision()) {
            return Err(Error::StructureErr(format!(
                "Decision {} is defined more than once",
                dfa.decision()
            )));
        }
        decisions.push(dfa);
    }

    Ok(DecisionSet {
        name,
        vocabulary,
        config,
        decisions,
    })
}

fn load_options(options: &Yaml) -> Result<SynthesisConfig, Error> {
    let mut config = SynthesisConfig::default();
    if options.is_badvalue() {
        return Ok(config);
    }

    if let Some(switches) = optional_bool(&options["switches"], "switches")? {
        config.generate_switches = switches;
    }
    if let Some(min_alts) = optional_usize(&options["min_switch_alts"], "min_switch_alts")? {
        config.min_switch_alts = min_alts;
    }
    if let Some(max_labels) =
        optional_usize(&options["max_switch_case_labels"], "max_switch_case_labels")?
    {
        config.max_switch_case_labels = max_labels;
    }
    if let Some(enumerate) = optional_str(&options["enumerate"], "enumerate")? {
        config.enumerate = enumerate.parse::<Enumeration>()?;
    }
    config.max_depth = optional_usize(&options["max_depth"], "max_depth")?;

    Ok(config)
}

fn load_decision(decision: &Yaml, vocabulary: &Vocabulary) -> Result<Dfa, Error> {
    let number = required_usize(&decision["number"], "number")?;
    let description = optional_str(&decision["description"], "description")?.unwrap_or("");
    let decision_type = match optional_str(&decision["type"], "type")? {
        None | Some("plain") => DecisionType::Plain,
        Some("loopback") => DecisionType::LoopBack,
        Some("optional") => DecisionType::OptionalBlockStart,
        Some(other) => {
            return Err(Error::StructureErr(format!(
                "Unknown decision type '{}' for decision {}",
                other, number
            )))
        }
    };

    let mut builder = SimpleDfaBuilder::new();
    builder
        .decision(number, description)
        .decision_type(decision_type)
        .mark_start(required_usize(&decision["start"], "start")?);

    for state in list(&decision["states"], "states")? {
        load_state(state, vocabulary, &mut builder)?;
    }

    builder
        .build()
        .map_err(|err| Error::DfaErr { decision: number, err })
}

fn load_state(
    state: &Yaml,
    vocabulary: &Vocabulary,
    builder: &mut SimpleDfaBuilder,
) -> Result<(), Error> {
    let id = required_usize(&state["id"], "id")?;
    let alt = optional_usize(&state["alt"], "alt")?;

    if optional_bool(&state["accept"], "accept")?.unwrap_or_else(|| alt.is_some()) {
        builder.mark_accepting(id);
    }
    if let Some(alt) = alt {
        builder.predict(id, alt);
    }
    if !state["gate"].is_badvalue() {
        builder.gate(id, load_context(&state["gate"])?);
    }
    if optional_bool(&state["resolved"], "resolved")?.unwrap_or(false) {
        builder.resolve_with_predicates(id);
    }

    for edge in list(&state["edges"], "edges")? {
        let target = required_usize(&edge["to"], "to")?;
        let label = load_label(&edge["on"], vocabulary)?;
        builder.mark_trans(id, target, label);
    }

    Ok(())
}

fn load_label(on: &Yaml, vocabulary: &Vocabulary) -> Result<Label, Error> {
    match *on {
        Yaml::String(_) | Yaml::Integer(_) => Ok(Label::atom(load_value(on, vocabulary)?)),
        Yaml::Array(ref values) => {
            let mut set = IntervalSet::new();
            for value in values {
                let value = load_value(value, vocabulary)?;
                if value == EOT && values.len() > 1 {
                    return Err(Error::StructureErr(
                        "EOT cannot be part of a label set".to_string(),
                    ));
                }
                set.add(value);
            }
            Ok(Label::set(set))
        }
        Yaml::Hash(_) => {
            if let Some(bounds) = on["range"].as_vec() {
                if bounds.len() != 2 {
                    return Err(Error::StructureErr(
                        "A range needs exactly two bounds".to_string(),
                    ));
                }
                let lo = load_value(&bounds[0], vocabulary)?;
                let hi = load_value(&bounds[1], vocabulary)?;
                if lo <= EOT && EOT <= hi {
                    return Err(Error::StructureErr(
                        "EOT cannot be part of a label range".to_string(),
                    ));
                }
                return Ok(Label::set(IntervalSet::range(lo, hi)));
            }
            if !on["pred"].is_badvalue() {
                return Ok(Label::predicate(load_context(&on["pred"])?));
            }
            Err(Error::StructureErr(
                "Edge labels must be a value, a list, a range or a predicate".to_string(),
            ))
        }
        Yaml::BadValue => Err(Error::StructureErr(
            "Edge is missing required field 'on'".to_string(),
        )),
        _ => Err(Error::StructureErr(
            "Edge labels must be a value, a list, a range or a predicate".to_string(),
        )),
    }
}

fn load_value(value: &Yaml, vocabulary: &Vocabulary) -> Result<i32, Error> {
    match *value {
        Yaml::Integer(number) => match i32::try_from(number) {
            Ok(number) => Ok(number),
            Err(_) => Err(Error::StructureErr(format!(
                "Label value {} is out of range",
                number
            ))),
        },
        Yaml::String(ref text) => {
            if let Some(c) = string_utils::parse_char_literal(text) {
                return Ok(c as i32);
            }
            match vocabulary.token_type(text) {
                Some(token_type) => Ok(token_type),
                None => Err(Error::UndefinedTokenErr(text.clone())),
            }
        }
        _ => Err(Error::StructureErr(
            "Label values must be token names, char literals or integers".to_string(),
        )),
    }
}

fn load_context(context: &Yaml) -> Result<SemanticContext, Error> {
    if let Some(text) = context.as_str() {
        return Ok(SemanticContext::predicate(text));
    }

    if !context["not"].is_badvalue() {
        return Ok(SemanticContext::not(load_context(&context["not"])?));
    }

    if !context["and"].is_badvalue() {
        combine(&context["and"], SemanticContext::and)
    } else if !context["or"].is_badvalue() {
        combine(&context["or"], SemanticContext::or)
    } else {
        Err(Error::StructureErr(
            "Predicates must be a string or one of 'and', 'or', 'not'".to_string(),
        ))
    }
}

fn combine(
    operands: &Yaml,
    join: fn(SemanticContext, SemanticContext) -> SemanticContext,
) -> Result<SemanticContext, Error> {
    let mut res: Option<SemanticContext> = None;
    for operand in list(operands, "predicate operands")? {
        let operand = load_context(operand)?;
        res = Some(match res {
            None => operand,
            Some(left) => join(left, operand),
        });
    }

    match res {
        Some(context) => Ok(context),
        None => Err(Error::StructureErr(
            "Predicate combinations need at least one operand".to_string(),
        )),
    }
}

fn list<'y>(node: &'y Yaml, field: &str) -> Result<&'y [Yaml], Error> {
    match *node {
        Yaml::BadValue => Ok(&[]),
        Yaml::Array(ref items) => Ok(items),
        _ => Err(Error::StructureErr(format!(
            "Field '{}' must be a list",
            field
        ))),
    }
}

fn optional_str<'y>(node: &'y Yaml, field: &str) -> Result<Option<&'y str>, Error> {
    match *node {
        Yaml::BadValue => Ok(None),
        Yaml::String(ref text) => Ok(Some(text)),
        _ => Err(Error::StructureErr(format!(
            "Field '{}' must be a string",
            field
        ))),
    }
}

fn optional_bool(node: &Yaml, field: &str) -> Result<Option<bool>, Error> {
    match *node {
        Yaml::BadValue => Ok(None),
        Yaml::Boolean(value) => Ok(Some(value)),
        _ => Err(Error::StructureErr(format!(
            "Field '{}' must be a boolean",
            field
        ))),
    }
}

fn optional_usize(node: &Yaml, field: &str) -> Result<Option<usize>, Error> {
    let value = match *node {
        Yaml::BadValue => return Ok(None),
        Yaml::Integer(value) => usize::try_from(value).ok(),
        _ => None,
    };

    match value {
        Some(value) => Ok(Some(value)),
        None => Err(Error::StructureErr(format!(
            "Field '{}' must be a non-negative integer",
            field
        ))),
    }
}

fn required_usize(node: &Yaml, field: &str) -> Result<usize, Error> {
    match optional_usize(node, field)? {
        Some(value) => Ok(value),
        None => Err(Error::StructureErr(format!(
            "Missing required field '{}'",
            field
        ))),
    }
}
