const TRUNCATED_MARKER: &str = "\n.[truncated]";
pub const MAX_PREVIEW_CONTENT: usize = 40_960;

/// Strips a leading YAML front matter block and caps the text for the preview pane.
pub fn prepare_preview_content(text: &str) -> String {
    let stripped = strip_frontmatter(text);
    if stripped.len() <= MAX_PREVIEW_CONTENT {
        stripped.to_string()
    } else {
        let mut end = MAX_PREVIEW_CONTENT;
        while end > 0 && !stripped.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}{TRUNCATED_MARKER}", &stripped[..end])
    }
}

fn strip_frontmatter(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("---\n") else {
        return text;
    };
    match rest.find("\n---") {
        Some(idx) => {
            let after = &rest[idx + "\n---".len()..];
            after.strip_prefix('\n').unwrap_or(after).trim_start_matches('\n')
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::{prepare_preview_content, strip_frontmatter, MAX_PREVIEW_CONTENT};

    #[test]
    fn short_content_kept_as_is() {
        assert_eq!(prepare_preview_content("short preview"), "short preview");
    }

    #[test]
    fn long_content_is_cut_on_a_char_boundary() {
        let content = format!("{}é", "a".repeat(MAX_PREVIEW_CONTENT - 1));
        let preview = prepare_preview_content(&content);
        assert!(preview.ends_with("\n.[truncated]"));
        assert!(preview.starts_with(&"a".repeat(MAX_PREVIEW_CONTENT - 1)));
        assert!(!preview.contains('é'));
    }

    #[test]
    fn front_matter_is_dropped() {
        assert_eq!(strip_frontmatter("---\ntitle: x\n---\n\nbody\n"), "body\n");
        assert_eq!(strip_frontmatter("---\nunterminated\n"), "---\nunterminated\n");
    }
}
