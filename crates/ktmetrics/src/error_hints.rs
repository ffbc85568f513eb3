use anyhow::Error;

pub(crate) fn format(err: &Error) -> String {
    let mut out = format!("Error: {err:#}");
    let hints = suggestions(err);
    if !hints.is_empty() {
        out.push_str("\n\nHints:\n");
        for hint in hints {
            out.push_str("- ");
            out.push_str(&hint);
            out.push('\n');
        }
    }
    out
}

fn suggestions(err: &Error) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let haystack = chain.join(" | ").to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();

    if haystack.contains("path not found") || haystack.contains("no such file or directory") {
        push_hint(&mut out, "Verify the input path exists and is readable.");
        push_hint(
            &mut out,
            "Use an absolute path to avoid working-directory confusion.",
        );
    }

    if haystack.contains("invalid config file") {
        push_hint(
            &mut out,
            "Check `ktmetrics.toml` syntax and key names (format, noav, exclude, ...).",
        );
        push_hint(&mut out, "Skip the file for one run with `--no-config`.");
    }

    if haystack.contains("failed to read config file") {
        push_hint(&mut out, "Check the path passed to `--config`.");
    }

    if haystack.contains("invalid exclude pattern") {
        push_hint(
            &mut out,
            "Exclude patterns use gitignore glob syntax, e.g. `--exclude \"**/build/**\"`.",
        );
    }

    if haystack.contains("failed to create") {
        push_hint(
            &mut out,
            "Make sure the `--out` location is writable, or omit it to print to stdout.",
        );
    }

    out
}

fn push_hint(out: &mut Vec<String>, hint: &str) {
    if !out.iter().any(|h| h == hint) {
        out.push(hint.to_string());
    }
}
