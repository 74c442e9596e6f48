#[cfg(target_os = "windows")]
use crate::collectors::command::run_powershell;
#[cfg(not(target_os = "windows"))]
use crate::collectors::command::run_command;
use crate::collectors::{first_available, Probe};
use crate::state::Resolution;

/// Display resolution. `reported` is the size handed in by the caller and wins when present.
pub fn resolution(reported: Option<Resolution>) -> Option<Resolution> {
    let mut chain = vec![Probe::new("reported", move || reported)];
    chain.extend(platform_chain());
    first_available("screen", chain)
}

#[cfg(target_os = "windows")]
fn platform_chain() -> Vec<Probe<'static, Resolution>> {
    vec![Probe::new("cim", || {
        parse_pair(
            &run_powershell(
                "Get-CimInstance Win32_VideoController -ErrorAction SilentlyContinue | Where-Object { $_.CurrentHorizontalResolution } | Select-Object -First 1 | ForEach-Object { \"$($_.CurrentHorizontalResolution)x$($_.CurrentVerticalResolution)\" }",
            ),
            'x',
        )
    })]
}

#[cfg(not(target_os = "windows"))]
fn platform_chain() -> Vec<Probe<'static, Resolution>> {
    vec![
        Probe::new("xrandr", || {
            parse_xrandr_current(&run_command("xrandr", &["--current"]))
        }),
        Probe::new("fbdev", || {
            std::fs::read_to_string("/sys/class/graphics/fb0/virtual_size")
                .ok()
                .and_then(|v| parse_pair(&v, ','))
        }),
    ]
}

/// Reads `current W x H` from the `Screen 0:` header line of `xrandr`.
pub fn parse_xrandr_current(text: &str) -> Option<Resolution> {
    let line = text.lines().find(|l| l.contains(" current "))?;
    let after = line.split(" current ").nth(1)?;
    let mode = after.split(',').next()?;
    let compact: String = mode.chars().filter(|c| !c.is_whitespace()).collect();
    parse_pair(&compact, 'x')
}

pub fn parse_pair(text: &str, separator: char) -> Option<Resolution> {
    let (w, h) = text.trim().split_once(separator)?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some(Resolution { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_size_wins() {
        let reported = Resolution {
            width: 2560,
            height: 1440,
        };
        assert_eq!(resolution(Some(reported)), Some(reported));
    }

    #[test]
    fn parses_xrandr_header() {
        let text = "Screen 0: minimum 320 x 200, current 1920 x 1080, maximum 16384 x 16384\n\
                    eDP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 344mm x 193mm\n";
        assert_eq!(
            parse_xrandr_current(text),
            Some(Resolution {
                width: 1920,
                height: 1080
            })
        );
        assert_eq!(parse_xrandr_current("Can't open display"), None);
    }

    #[test]
    fn parses_pairs() {
        assert_eq!(
            parse_pair("1366,768\n", ','),
            Some(Resolution {
                width: 1366,
                height: 768
            })
        );
        assert_eq!(parse_pair("0x0", 'x'), None);
        assert_eq!(parse_pair("", 'x'), None);
    }
}
