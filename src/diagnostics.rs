use crate::error::Error;

/// ANSI bold, for markdown headings.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where the user can act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ProjectCorrupt { path, reason } => render_project_corrupt(&path.display().to_string(), reason),
        Error::UnsupportedFileLayout { value } => render_unsupported_layout(value),
        Error::Json(inner) => format!(
            "\
# Error: Invalid Project Record

{inner}

## Fix

Correct the JSON by hand, or delete the record and run `htmlloc build` to start over.
"
        ),
        Error::TomlDe(inner) => format!(
            "\
# Error: Invalid Scan Config

{inner}

## Fix

`.htmlloc.toml` accepts only `include` and `exclude` lists of path prefixes:

    include = [\"pages/\"]
    exclude = [\"pages/drafts/\"]
"
        ),
        Error::Io(inner) => format!(
            "\
# Error: I/O

{inner}
"
        ),
        _ => format!(
            "\
# Error

{e}
"
        ),
    };
}

/// Corrupt record: which file, what is wrong, what must hold.
fn render_project_corrupt(path: &str, reason: &str) -> String {
    let path = if path.is_empty() { "project record" } else { path };
    return format!(
        "\
# Error: Project Record Corrupt

`{path}`: {reason}

## Fix

Document paths must be unique (ignoring case) and field names unique within
a document. Remove the duplicate entry from the record.
"
    );
}

/// Rejected `--file-layout` value with the accepted ones.
fn render_unsupported_layout(value: &str) -> String {
    return format!(
        "\
# Error: Unsupported File Layout

`{value}` is not a file layout.

## Supported layouts

- `SubDirectory`: `dir/<culture>/page.html`
- `Extensions`: `dir/page.<culture>.html`
"
    );
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn corrupt_record_names_file_and_reason() {
        let md = render_error(&Error::ProjectCorrupt {
            path: PathBuf::from("site/project.json"),
            reason: "document `a.html` listed twice".to_string(),
        });
        assert!(md.starts_with("# Error: Project Record Corrupt"));
        assert!(md.contains("`site/project.json`: document `a.html` listed twice"));
    }

    #[test]
    fn layout_error_lists_alternatives() {
        let md = render_error(&Error::UnsupportedFileLayout {
            value: "Flat".to_string(),
        });
        assert!(md.contains("`Flat`"));
        assert!(md.contains("SubDirectory"));
        assert!(md.contains("Extensions"));
    }

    #[test]
    fn other_errors_use_display() {
        let md = render_error(&Error::MissingIdentifier { what: "field name" });
        assert_eq!(md, "# Error\n\nmissing identifier: field name must not be empty\n");
    }
}
