#[cfg(target_os = "windows")]
use crate::collectors::command::first_value_after_header;
use crate::collectors::command::run_command;

const PCI_GPU_CLASSES: [&str; 2] = ["VGA compatible controller", "3D controller"];

#[cfg(target_os = "windows")]
pub fn gpu_name() -> Option<String> {
    first_value_after_header(&run_command(
        "wmic",
        &["path", "win32_VideoController", "get", "name"],
    ))
}

#[cfg(not(target_os = "windows"))]
pub fn gpu_name() -> Option<String> {
    gpu_from_lspci(&run_command("lspci", &[]))
}

/// Name from the first lspci line describing a display controller: everything after the
/// slot and the first word of the class.
pub fn gpu_from_lspci(text: &str) -> Option<String> {
    text.lines()
        .find(|line| PCI_GPU_CLASSES.iter().any(|class| line.contains(class)))
        .and_then(|line| {
            let rest = line.trim_start();
            let rest = rest.split_once(char::is_whitespace)?.1.trim_start();
            let rest = rest.split_once(char::is_whitespace)?.1.trim();
            (!rest.is_empty()).then(|| rest.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_controller_wins() {
        let text = "00:00.0 Host bridge: Intel Corporation 8th Gen Core Processor Host Bridge\n\
                    00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 630\n\
                    01:00.0 3D controller: NVIDIA Corporation GP107M [GeForce GTX 1050 Mobile]\n";
        assert_eq!(
            gpu_from_lspci(text).as_deref(),
            Some("compatible controller: Intel Corporation UHD Graphics 630")
        );
    }

    #[test]
    fn three_d_controller_is_recognised() {
        let text = "01:00.0 3D controller: NVIDIA Corporation GA102 [GeForce RTX 3090]";
        assert_eq!(
            gpu_from_lspci(text).as_deref(),
            Some("controller: NVIDIA Corporation GA102 [GeForce RTX 3090]")
        );
    }

    #[test]
    fn no_display_controller_is_absent() {
        assert_eq!(gpu_from_lspci(""), None);
        assert_eq!(
            gpu_from_lspci("00:1f.3 Audio device: Intel Corporation Cannon Lake PCH cAVS"),
            None
        );
    }
}
