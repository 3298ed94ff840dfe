//! bazel-depgen CLI entry point
//!
//! Parses arguments, runs the command and turns failures into a colored
//! report and the matching exit code.

use bazel_depgen::cli;
use bazel_depgen::core::user_friendly_error;
use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(error_ctx.exit_code().code());
    }
}
