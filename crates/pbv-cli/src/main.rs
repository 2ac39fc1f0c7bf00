pub mod cli;
pub mod cmd;
pub mod error;
pub mod format;
pub mod io;
pub mod valuejson;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use clap::Parser;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    let cli = Cli::parse();

    let result = dispatch(&cli);

    if let Err(e) = result {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Dispatches the parsed CLI arguments to the appropriate command handler.
///
/// Returns `Ok(())` on success or a [`error::CliError`] on failure. The
/// caller is responsible for printing the error message and exiting with the
/// appropriate exit code.
fn dispatch(cli: &Cli) -> Result<(), error::CliError> {
    match &cli.command {
        Command::Compile { schema, out, violation_capacity } => {
            cmd::compile::run(schema, out, *violation_capacity, cli.max_file_size, cli.quiet)
        }

        Command::Check { schema, payload, message } => cmd::check::run(
            schema,
            payload,
            message,
            cli.max_file_size,
            &cli.format,
            cli.quiet,
            cli.verbose,
            cli.no_color,
        ),
    }
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`).
///
/// Rust's runtime ignores `SIGPIPE` by default, which causes programs that
/// write to a closed pipe (e.g. `pbv check schema.json payload.json --message M | head`)
/// to receive an `Err(BrokenPipe)` from a write call rather than being
/// terminated silently. By restoring the default disposition, the kernel
/// will terminate the process with exit code 0 (consistent with standard
/// Unix behavior) when a write to a closed pipe occurs.
///
/// This function uses `libc::signal` which requires the `libc` crate. It is
/// only compiled on Unix targets via `#[cfg(unix)]` at the call site.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: signal() is safe to call during single-threaded program
    // initialization before any other threads are spawned. SIG_DFL is a valid
    // handler for SIGPIPE. The return value (previous handler) is discarded.
    //
    // The workspace denies `unsafe_code` globally, but this is the minimal
    // unavoidable use of libc required for SIGPIPE handling on Unix. There is
    // no safe Rust equivalent in the standard library.
    //
    // We use an inline allow rather than a workspace-level exception so the
    // scope of the unsafe block is as narrow as possible.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}
