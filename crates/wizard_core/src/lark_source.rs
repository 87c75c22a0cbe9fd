use url::Url;

use crate::adapter::{PreviewTarget, SourceAdapter};
use crate::{DataSourceType, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LarkDocKind {
    Docx,
    Wiki,
}

/// Parsed form of a Lark/Feishu document link, used for display only.
///
/// The backend lookup is the sole judge of whether a reference is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LarkLink {
    pub kind: LarkDocKind,
    pub token: String,
}

impl LarkLink {
    pub fn parse(reference: &str) -> Option<Self> {
        let url = Url::parse(reference.trim()).ok()?;
        if url.scheme() != "https" {
            return None;
        }
        let host = url.host_str()?;
        if !(host.ends_with(".feishu.cn") || host.ends_with(".larksuite.com")) {
            return None;
        }
        let mut segments = url.path_segments()?;
        let kind = match segments.next()? {
            "docx" => LarkDocKind::Docx,
            "wiki" => LarkDocKind::Wiki,
            _ => return None,
        };
        let token = segments.next()?;
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(Self {
            kind,
            token: token.to_string(),
        })
    }
}

/// Lark adapter state.
///
/// A reference only becomes the committed selection once its preview lookup
/// succeeds; at most one lookup is in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LarkSource {
    input: String,
    committed: Option<String>,
    committed_title: Option<String>,
    loading: bool,
}

impl LarkSource {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn committed_title(&self) -> Option<&str> {
        self.committed_title.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Editing the input never touches the committed reference.
    pub fn set_input(&mut self, text: String) {
        self.input = text;
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn commit(&mut self, reference: String, title: String) {
        self.committed = Some(reference);
        self.committed_title = Some(title);
    }

    /// Explicit dismissal; the only way to drop a committed reference.
    pub fn dismiss(&mut self) -> bool {
        let had = self.committed.is_some();
        self.committed = None;
        self.committed_title = None;
        had
    }
}

impl SourceAdapter for LarkSource {
    fn source_type(&self) -> DataSourceType {
        DataSourceType::Lark
    }

    fn is_ready(&self) -> bool {
        self.committed
            .as_deref()
            .is_some_and(|reference| !reference.is_empty())
    }

    fn committed_selection(&self) -> Option<Selection> {
        self.committed
            .clone()
            .filter(|reference| !reference.is_empty())
            .map(Selection::LarkDocument)
    }

    fn preview_target(&self, key: &str) -> Option<PreviewTarget> {
        let reference = key.trim();
        if reference.is_empty() {
            return None;
        }
        Some(PreviewTarget::LarkDocument {
            reference: reference.to_string(),
        })
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{LarkDocKind, LarkLink, LarkSource};
    use crate::adapter::SourceAdapter;

    #[test]
    fn parses_docx_and_wiki_links() {
        let docx = LarkLink::parse("https://acme.feishu.cn/docx/AbC123?from=share").unwrap();
        assert_eq!(docx.kind, LarkDocKind::Docx);
        assert_eq!(docx.token, "AbC123");

        let wiki = LarkLink::parse("  https://acme.larksuite.com/wiki/Zz9  ").unwrap();
        assert_eq!(wiki.kind, LarkDocKind::Wiki);
        assert_eq!(wiki.token, "Zz9");
    }

    #[test]
    fn rejects_foreign_or_malformed_links() {
        assert!(LarkLink::parse("http://acme.feishu.cn/docx/AbC").is_none());
        assert!(LarkLink::parse("https://example.com/docx/AbC").is_none());
        assert!(LarkLink::parse("https://acme.feishu.cn/sheets/AbC").is_none());
        assert!(LarkLink::parse("https://acme.feishu.cn/docx/").is_none());
        assert!(LarkLink::parse("not a link").is_none());
    }

    #[test]
    fn editing_input_keeps_committed_reference() {
        let mut source = LarkSource::default();
        source.commit("ref-1".to_string(), "Title".to_string());
        source.set_input(String::new());
        assert_eq!(source.committed(), Some("ref-1"));
        assert!(source.is_ready());

        assert!(source.dismiss());
        assert!(!source.is_ready());
    }

    #[test]
    fn blank_input_has_no_preview_target() {
        let source = LarkSource::default();
        assert!(source.preview_target("   ").is_none());
        assert!(source.preview_target(" ref ").is_some());
    }
}
