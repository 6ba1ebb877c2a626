use std::process::ExitCode;

fn main() -> ExitCode {
    casefit_cli::run()
}
