use {
    clap::ArgMatches,
    colored::{ColoredString, Colorize},
    log::{LevelFilter, Record},
    log4rs::{
        append::file::FileAppender,
        config::{Appender, Config, Root},
        encode::{pattern::PatternEncoder, Encode, Write as LogWrite},
    },
    std::{
        error::Error,
        io::{self, Write},
        panic,
    },
};

static DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
static LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}";

lazy_static! {
    static ref PREFIX_ERR: ColoredString = "error".bright_red();
    static ref PREFIX_FATAL: ColoredString = "fatal".on_bright_red();
    static ref PREFIX_GEN: ColoredString = "  GEN".bright_blue();
    static ref PREFIX_GEN_OK: ColoredString = "   OK".bright_green();
    static ref PREFIX_GEN_ERR: ColoredString = "ERROR".bright_red();
}

macro_rules! catch_fatal {
    ($body: block, $catch: block) => {
        std::panic::set_hook(Box::new(|info| {
            if !info.payload().is::<crate::cli::logger::Fatal>() {
                let backtrace = backtrace::Backtrace::new();

                println!("{}", info);
                error!("{}", info);
                println!("{:?}", backtrace);
                error!("{:?}", backtrace);
            }
        }));

        if let Err(err) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            if err.is::<crate::cli::logger::Fatal>() {
                $catch

                #[allow(unreachable_code)]
                {
                    let _ = std::panic::take_hook();
                }
            } else {
                std::panic::resume_unwind(err)
            }
        }
    };
}

/// Panic payload raised by `fatal` once the failure has been reported.
pub struct Fatal;

pub fn init(matches: &ArgMatches) {
    if let Some(log_file) = matches.value_of("logfile") {
        let log_level = matches
            .value_of("loglevel")
            .and_then(|level| level.parse::<LevelFilter>().ok())
            .unwrap_or(DEFAULT_LOG_LEVEL);

        let encoder = SanitizedEncoder::wrap(PatternEncoder::new(LOG_PATTERN));
        let file_appender = match FileAppender::builder()
            .encoder(Box::new(encoder))
            .build(log_file)
        {
            Ok(file_appender) => file_appender,
            Err(err) => fatal(&format!("Failed to open log file {}: {}", log_file, err)),
        };

        let config = match Config::builder()
            .appender(Appender::builder().build("file", Box::new(file_appender)))
            .build(Root::builder().appender("file").build(log_level))
        {
            Ok(config) => config,
            Err(err) => fatal(&format!("Invalid logger configuration: {}", err)),
        };

        if let Err(err) = log4rs::init_config(config) {
            fatal(&format!("Failed to initialize logger: {}", err));
        }
    }

    info!("lookahead {} started", crate_version!());
}

pub fn info(string: &str) {
    println!("{}", string);
    info!("{}", string);
}

pub fn err(string: &str) {
    println!("{}: {}", *PREFIX_ERR, string);
    error!("{}", string);
}

pub fn fatal(string: &str) -> ! {
    println!("{}: {}", *PREFIX_FATAL, string);
    error!("{}", string);
    panic::panic_any(Fatal);
}

pub fn gen(string: &str) {
    println!("{}| {}", *PREFIX_GEN, string);
    debug!("Generating {} ...", string);
}

pub fn gen_ok(string: &str) {
    println!("{}| {}", *PREFIX_GEN_OK, string);
    debug!("Finished generating {}", string);
}

pub fn gen_err(string: &str) {
    println!("{}| {}", *PREFIX_GEN_ERR, string);
    error!("{}", string);
}

/// Strips the console colouring from records before they reach the log file.
#[derive(Debug)]
struct SanitizedEncoder {
    inner: Box<dyn Encode>,
}

impl SanitizedEncoder {
    fn wrap(inner: impl Encode) -> Self {
        SanitizedEncoder {
            inner: Box::new(inner),
        }
    }
}

impl Encode for SanitizedEncoder {
    fn encode(
        &self,
        w: &mut dyn LogWrite,
        record: &Record,
    ) -> Result<(), Box<dyn Error + Sync + Send>> {
        let mut buffer = RecordBuffer(Vec::new());
        self.inner.encode(&mut buffer, record)?;
        w.write_all(&strip_ansi_escapes::strip(buffer.0)?)?;
        Ok(())
    }
}

struct RecordBuffer(Vec<u8>);

impl Write for RecordBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogWrite for RecordBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_encoder_strips_colours() {
        //setup
        let encoder = SanitizedEncoder::wrap(PatternEncoder::new("{l} {m}"));
        let mut out = RecordBuffer(Vec::new());
        let message = format!("{}| decision 1", *PREFIX_GEN_OK);

        //exercise
        encoder
            .encode(
                &mut out,
                &Record::builder()
                    .level(log::Level::Info)
                    .args(format_args!("{}", message))
                    .build(),
            )
            .unwrap();

        //verify
        assert_eq!(String::from_utf8(out.0).unwrap(), "INFO    OK| decision 1");
    }
}
