use std::process::ExitCode;

use flusim::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
