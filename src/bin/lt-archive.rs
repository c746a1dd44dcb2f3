#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for the archive binaries.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod support;

use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    support::dispatch(env::args_os(), &mut stdout, &mut stderr, cli::run_lt_archive)
}
