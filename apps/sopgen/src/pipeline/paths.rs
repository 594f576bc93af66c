//! Deterministic file naming for prompt and SOP outputs.

use std::path::{Path, PathBuf};

pub const PROMPT_SUFFIX: &str = "_prompt.txt";
pub const SOP_SUFFIX: &str = "_sop.txt";

const MAX_COMPONENT_CHARS: usize = 80;

/// Collapses every run of non-alphanumeric characters to `_`.
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    let truncated: String = out.chars().take(MAX_COMPONENT_CHARS).collect();
    let truncated = truncated.trim_end_matches('_');
    if truncated.is_empty() {
        "unknown".to_string()
    } else {
        truncated.to_string()
    }
}

/// `<course>_<university>_prompt.txt`
pub fn prompt_file_name(course: &str, university: &str) -> String {
    format!(
        "{}_{}{PROMPT_SUFFIX}",
        sanitize_component(course),
        sanitize_component(university)
    )
}

/// SOP output path for a prompt file: the trailing `_prompt.txt` becomes
/// `_sop.txt`, placed in `sops_dir`.
pub fn sop_path_for(prompt_path: &Path, sops_dir: &Path) -> PathBuf {
    let file_name = prompt_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sop_name = match file_name.strip_suffix(PROMPT_SUFFIX) {
        Some(base) => format!("{base}{SOP_SUFFIX}"),
        None => {
            let stem = prompt_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            format!("{stem}{SOP_SUFFIX}")
        }
    };

    sops_dir.join(sop_name)
}
