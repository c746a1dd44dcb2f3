use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

/// Reads the auxiliary file names a restart file records in a variable.
///
/// Some components store the history files they need on restart inside the
/// restart file itself. The archive process asks an inspector for those names
/// so the files travel with the restart set.
pub trait RestartInspector {
    /// File names listed by `varname` inside `restart`.
    fn auxiliary_files(&self, restart: &Path, varname: &str) -> io::Result<Vec<String>>;
}

/// Inspector backed by the netCDF `ncdump` tool.
#[derive(Clone, Debug)]
pub struct NcdumpInspector {
    program: OsString,
}

impl NcdumpInspector {
    /// Uses `ncdump` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: OsString::from("ncdump"),
        }
    }

    /// Uses a specific `ncdump` executable.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NcdumpInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl RestartInspector for NcdumpInspector {
    fn auxiliary_files(&self, restart: &Path, varname: &str) -> io::Result<Vec<String>> {
        let output = Command::new(&self.program)
            .arg("-v")
            .arg(varname)
            .arg(restart)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(io::Error::other(format!(
                "ncdump -v {varname} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_ncdump_variable(&stdout, varname))
    }
}

/// Extracts the quoted, non-blank values of `varname` from `ncdump -v` output.
///
/// Only the data section is read (`varname = ... ;`); declarations and
/// attributes such as `varname:long_name = "..."` are ignored. Directory
/// components are stripped from each value.
#[must_use]
pub fn parse_ncdump_variable(output: &str, varname: &str) -> Vec<String> {
    let Some(body) = data_section(output, varname) else {
        return Vec::new();
    };

    let mut names = Vec::new();
    let mut current: Option<String> = None;
    for ch in body.chars() {
        if let Some(value) = current.as_mut() {
            if ch == '"' {
                push_file_name(&mut names, value.trim());
                current = None;
            } else {
                value.push(ch);
            }
        } else if ch == '"' {
            current = Some(String::new());
        } else if ch == ';' {
            break;
        }
    }
    names
}

fn data_section<'a>(output: &'a str, varname: &str) -> Option<&'a str> {
    let mut offset = 0;
    for line in output.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(varname)
            && rest.trim_start().starts_with('=')
        {
            let start = offset + (line.len() - trimmed.len()) + varname.len();
            let after = &output[start..];
            let equals = after.find('=')?;
            return Some(&after[equals + 1..]);
        }
        offset += line.len();
    }
    None
}

fn push_file_name(names: &mut Vec<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    let name = Path::new(value)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(value);
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_owned());
    }
}
