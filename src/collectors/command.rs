use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Runs an external tool and returns its trimmed stdout.
///
/// Stderr is discarded. A missing tool, a non-zero exit status or a spawn error all
/// collapse to an empty string.
pub fn run_command(program: &str, args: &[&str]) -> String {
    match spawn_and_wait(program, args) {
        Some(output) if output.status.success() => {
            decode_cmd_stdout(&output.stdout).trim_end().to_string()
        }
        Some(output) => {
            debug!(program, status = ?output.status.code(), "внешняя утилита завершилась с ошибкой");
            String::new()
        }
        None => String::new(),
    }
}

/// Like [`run_command`], but keeps stdout whatever the exit status.
///
/// For tools such as `smartctl` that encode findings as exit status bits.
pub fn run_command_any_status(program: &str, args: &[&str]) -> String {
    match spawn_and_wait(program, args) {
        Some(output) => {
            if !output.status.success() {
                debug!(program, status = ?output.status.code(), "ненулевой код возврата, вывод сохранён");
            }
            decode_cmd_stdout(&output.stdout).trim_end().to_string()
        }
        None => String::new(),
    }
}

fn spawn_and_wait(program: &str, args: &[&str]) -> Option<Output> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|err| debug!(program, error = %err, "не удалось запустить внешнюю утилиту"))
        .ok()
}

#[cfg(target_os = "windows")]
pub fn run_powershell(script: &str) -> String {
    let wrapped_script = format!(
        "[Console]::OutputEncoding=[System.Text.UTF8Encoding]::new($false); {script}"
    );
    let out = run_command("powershell", &["-NoProfile", "-Command", &wrapped_script]);
    if !out.is_empty() {
        return out;
    }
    run_command(
        r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe",
        &["-NoProfile", "-Command", &wrapped_script],
    )
}

/// Returns the first line after the column header of a `wmic ... get <column>` listing.
pub fn first_value_after_header(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .nth(1)
        .map(str::to_string)
}

pub fn decode_cmd_stdout(bytes: &[u8]) -> String {
    if let Ok(utf8) = std::str::from_utf8(bytes) {
        return utf8.to_string();
    }

    if bytes.len() >= 2 && bytes.len() % 2 == 0 {
        let u16buf: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&u16buf) {
            return s.trim_start_matches('\u{feff}').to_string();
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

pub fn parse_f64_loose(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }

    trimmed.replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_yields_empty_string() {
        assert_eq!(run_command("hwscope-no-such-tool-4711", &["--version"]), "");
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_trimmed_and_stderr_dropped() {
        let out = run_command("sh", &["-c", "echo hello; echo noise 1>&2; printf '  \\n\\n'"]);
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_yields_empty_string() {
        assert_eq!(run_command("sh", &["-c", "echo partial; exit 3"]), "");
    }

    #[cfg(unix)]
    #[test]
    fn any_status_keeps_stdout_of_failing_tool() {
        let out = run_command_any_status("sh", &["-c", "echo partial; exit 8"]);
        assert_eq!(out, "partial");
        assert_eq!(run_command_any_status("hwscope-no-such-tool-4711", &[]), "");
    }

    #[test]
    fn decodes_utf16_output() {
        let bytes: Vec<u8> = "\u{feff}Name\r\nGPU"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        assert_eq!(decode_cmd_stdout(&bytes), "Name\r\nGPU");
    }

    #[test]
    fn header_is_skipped() {
        let text = "SerialNumber  \r\n\r\nPF2ABCDE  \r\n";
        assert_eq!(first_value_after_header(text).as_deref(), Some("PF2ABCDE"));
        assert_eq!(first_value_after_header("SerialNumber\r\n"), None);
    }

    #[test]
    fn loose_float_accepts_comma() {
        assert_eq!(parse_f64_loose(" 3,5 "), Some(3.5));
        assert_eq!(parse_f64_loose("abc"), None);
    }
}
