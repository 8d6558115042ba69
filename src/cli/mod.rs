use {clap::App, std::process};

mod cmd;
#[macro_use]
mod logger;

pub fn run() {
    let clap_config = load_yaml!("cli.yml");
    let matches = App::from_yaml(clap_config).get_matches();

    catch_fatal!(
        {
            logger::init(&matches);

            match matches.subcommand() {
                ("gen", Some(matches)) => cmd::gen(matches),
                ("tree", Some(matches)) => cmd::tree(matches),
                _ => logger::err("No command given, see --help"),
            }
        },
        {
            process::exit(1);
        }
    );
}
