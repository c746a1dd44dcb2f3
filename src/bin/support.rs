use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

/// Runs a front-end and converts its status into a process exit code.
///
/// Statuses outside the documented [`workflow::ExitCode`] set collapse to a
/// generic failure.
pub fn dispatch<I, Out, Err, Run>(
    args: I,
    stdout: &mut Out,
    stderr: &mut Err,
    run: Run,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    Out: Write,
    Err: Write,
    Run: FnOnce(I, &mut Out, &mut Err) -> i32,
{
    let status = run(args, stdout, stderr);
    let _ = stdout.flush();
    let _ = stderr.flush();
    workflow::ExitCode::from_i32(status).map_or(ExitCode::FAILURE, ExitCode::from)
}
