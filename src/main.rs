use std::process::ExitCode;

fn main() -> ExitCode {
    monkey::cli::run()
}
