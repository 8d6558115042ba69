use {
    crate::cli::logger,
    clap::ArgMatches,
    colored::{ColoredString, Colorize},
    lookahead::{
        core::{dfa::Dfa, gen::config::Enumeration},
        Generated, GenerationJobRunner,
    },
    std::{
        fs::File,
        io::{Read, Write},
    },
    stopwatch::Stopwatch,
};

pub fn gen(matches: &ArgMatches) {
    let mut sw = Stopwatch::new();
    sw.start();

    let gjr = load_runner(matches);
    let thread_count = thread_count(matches);

    let res = match matches.value_of("matching") {
        Some(pattern) => gjr.generate_parallel_matching(pattern, thread_count),
        None => gjr.generate_parallel(thread_count),
    };

    let generated = match res {
        Ok(generated) => generated,
        Err(err) => {
            logger::gen_err(&format!("{}", err));
            logger::fatal("Generation failed, no output was written");
        }
    };

    let code: Vec<&str> = generated.iter().map(|gen| &gen.code[..]).collect();
    let code = code.join("\n");

    match matches.value_of("output") {
        None => print!("{}", code),
        Some(output_path) => {
            write_output(output_path, &code);
            for gen in &generated {
                logger::gen_ok(&describe(gen));
            }

            sw.stop();
            print_final_status(sw.elapsed_ms(), &gjr, &generated);
        }
    }
}

pub fn tree(matches: &ArgMatches) {
    let gjr = load_runner(matches);

    let numbers: Vec<usize> = match matches.value_of("decision") {
        None => gjr.decisions().iter().map(Dfa::decision).collect(),
        Some(number) => match number.parse::<usize>() {
            Ok(number) => vec![number],
            Err(_) => logger::fatal(&format!("Invalid decision number: '{}'", number)),
        },
    };

    for number in numbers {
        logger::gen(&format!("decision {}", number));
        match gjr.synthesize(number) {
            Ok(tree) => print!("{}", tree.to_tree_string()),
            Err(err) => logger::gen_err(&format!("{}", err)),
        }
    }
}

fn load_runner(matches: &ArgMatches) -> GenerationJobRunner {
    let description_path = match matches.value_of("description") {
        Some(path) => path,
        None => logger::fatal("Missing automaton description path"),
    };

    info!("Loading description {} ...", description_path);

    let mut description = String::new();
    match File::open(description_path) {
        Ok(mut description_file) => {
            if let Err(err) = description_file.read_to_string(&mut description) {
                logger::fatal(&format!(
                    "Could not read description file \"{}\": {}",
                    description_path, err
                ));
            }
        }
        Err(err) => logger::fatal(&format!(
            "Could not find description file \"{}\": {}",
            description_path, err
        )),
    }

    let gjr = match GenerationJobRunner::build(&description) {
        Ok(gjr) => gjr,
        Err(err) => logger::fatal(&format!(
            "Error loading description {}: {}",
            description_path, err
        )),
    };

    let mut config = gjr.config().clone();
    if matches.is_present("no-switch") {
        config.generate_switches = false;
    }
    if let Some(enumerate) = matches.value_of("enumerate") {
        match enumerate.parse::<Enumeration>() {
            Ok(enumerate) => config.enumerate = enumerate,
            Err(err) => logger::fatal(&format!("{}", err)),
        }
    }

    gjr.with_config(config)
}

fn thread_count(matches: &ArgMatches) -> usize {
    match matches.value_of("threads") {
        None => 1,
        Some(threads) => match threads.parse::<usize>() {
            Ok(threads) if threads > 0 => threads,
            _ => {
                logger::err(&format!(
                    "Invalid number of threads: '{}'. Falling back to one thread",
                    threads
                ));
                1
            }
        },
    }
}

fn write_output(output_path: &str, code: &str) {
    match File::create(output_path) {
        Ok(mut output_file) => {
            if let Err(err) = output_file.write_all(code.as_bytes()) {
                logger::fatal(&format!(
                    "Could not write output file \"{}\": {}",
                    output_path, err
                ));
            }
        }
        Err(err) => logger::fatal(&format!(
            "Could not create output file \"{}\": {}",
            output_path, err
        )),
    }
}

fn describe(gen: &Generated) -> String {
    if gen.description.is_empty() {
        format!("decision {}", gen.decision)
    } else {
        format!("decision {}: {}", gen.decision, gen.description)
    }
}

fn print_final_status(elapsed_ms: i64, gjr: &GenerationJobRunner, generated: &[Generated]) {
    let skipped = gjr.decisions().len() - generated.len();

    let generated_msg: ColoredString = format!("{} generated", generated.len()).bright_green();

    let mut skipped_msg = format!("{} skipped", skipped).normal();
    if skipped > 0 {
        skipped_msg = skipped_msg.yellow()
    }

    println!();
    logger::info(&format!(
        "COMPLETE: {}ms : {} described, {}, {}",
        elapsed_ms,
        gjr.decisions().len(),
        generated_msg,
        skipped_msg
    ));
}
