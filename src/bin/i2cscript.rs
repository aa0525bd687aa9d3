use i2cscript::config::{usage, ConfigError, RunConfig, ScriptSource};
use i2cscript::logging;
use i2cscript::runner::{EXIT_FATAL, EXIT_USAGE};
use i2cscript::{BusSession, Interpreter, LinuxI2c, Transcript};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    logging::init_stderr_logging();

    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map_or_else(|| "i2cscript".to_owned(), |name| name.to_string_lossy().into_owned());

    let config = match RunConfig::from_args(&args) {
        Ok(config) => config,
        Err(ConfigError::Help | ConfigError::MissingScript) => {
            print!("{}", usage(&program));
            return ExitCode::from(EXIT_USAGE);
        }
        Err(e) => {
            eprintln!("{program}: {e}");
            print!("{}", usage(&program));
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let input: Box<dyn BufRead> = match &config.script {
        ScriptSource::Stdin => Box::new(io::stdin().lock()),
        ScriptSource::File(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!("{program}: {}: {e}", path.display());
                return ExitCode::from(EXIT_FATAL);
            }
        },
    };

    let session = BusSession::new(LinuxI2c, config.session_config());
    let transcript = Transcript::new(io::stdout().lock(), config.format);
    let mut interpreter = Interpreter::new(session, transcript);

    match interpreter.run(input) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
