use std::process::ExitCode;

fn main() -> ExitCode {
    fstcodec::cli::run_cli()
}
