use crate::error::{Result, Section, SfcJsError};
use regex::Regex;
use std::sync::LazyLock;

// First <template> up to the first </template> after it.
static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<template>(.*?)</template>").expect("template pattern is valid")
});

// Object literal after `export default`, up to the `};` that closes the script block.
// Only whitespace may follow that `;`, so an inner `};` never ends the literal.
static DEFAULT_EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script>\W*?export\W*?default\W*?(\{.*?\});\s*</script>")
        .expect("default export pattern is valid")
});

static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script>.*?</script>").expect("script block pattern is valid")
});

/// Locates one delimited region of a component document.
///
/// Implementations return a slice borrowed from `source`; they never copy or
/// rewrite the text.
pub trait SectionMatcher: Send + Sync {
    fn find<'a>(&self, source: &'a str) -> Option<&'a str>;
}

/// Matches the markup between `<template>` and `</template>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateMatcher;

impl SectionMatcher for TemplateMatcher {
    fn find<'a>(&self, source: &'a str) -> Option<&'a str> {
        TEMPLATE_RE
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Matches the default-exported object literal inside `<script>`, without
/// its terminating semicolon.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExportMatcher;

impl SectionMatcher for DefaultExportMatcher {
    fn find<'a>(&self, source: &'a str) -> Option<&'a str> {
        DEFAULT_EXPORT_RE
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Raw result of running both matchers over one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedSections<'a> {
    pub template: Option<&'a str>,
    pub script: Option<&'a str>,
    script_block_present: bool,
}

impl<'a> ExtractedSections<'a> {
    /// Both sections, or the error naming the first one that failed to match.
    pub fn require(self) -> Result<(&'a str, &'a str)> {
        let template = self.template.ok_or(SfcJsError::MissingSection {
            section: Section::Template,
        })?;

        let script = match self.script {
            Some(script) => script,
            None if self.script_block_present => return Err(SfcJsError::MalformedScript),
            None => {
                return Err(SfcJsError::MissingSection {
                    section: Section::Script,
                })
            }
        };

        Ok((template, script))
    }

    pub fn is_complete(&self) -> bool {
        self.template.is_some() && self.script.is_some()
    }
}

/// Runs a template matcher and a script matcher over a document.
pub struct SectionExtractor {
    template: Box<dyn SectionMatcher>,
    script: Box<dyn SectionMatcher>,
}

impl SectionExtractor {
    pub fn new() -> Self {
        Self {
            template: Box::new(TemplateMatcher),
            script: Box::new(DefaultExportMatcher),
        }
    }

    pub fn with_template_matcher<M: SectionMatcher + 'static>(mut self, matcher: M) -> Self {
        self.template = Box::new(matcher);
        self
    }

    pub fn with_script_matcher<M: SectionMatcher + 'static>(mut self, matcher: M) -> Self {
        self.script = Box::new(matcher);
        self
    }

    pub fn extract<'a>(&self, source: &'a str) -> ExtractedSections<'a> {
        let script = self.script.find(source);

        ExtractedSections {
            template: self.template.find(source),
            script,
            script_block_present: script.is_some() || SCRIPT_BLOCK_RE.is_match(source),
        }
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "<template>\n  <div>{{ msg }}</div>\n</template>\n\n<script>\nexport default {\n  name: 'Basic'\n};\n</script>";

    #[test]
    fn test_template_extraction() {
        let template = TemplateMatcher.find(BASIC).unwrap();
        assert_eq!(template, "\n  <div>{{ msg }}</div>\n");
    }

    #[test]
    fn test_template_is_non_greedy() {
        let source = "<template><p>first</p></template><template><p>second</p></template>";
        assert_eq!(TemplateMatcher.find(source), Some("<p>first</p>"));
    }

    #[test]
    fn test_script_excludes_semicolon() {
        let script = DefaultExportMatcher.find(BASIC).unwrap();
        assert_eq!(script, "{\n  name: 'Basic'\n}");
    }

    #[test]
    fn test_script_allows_trailing_whitespace() {
        let source = "<template></template><script>\nexport default {\n  name: 'x'\n};   \n</script>";
        assert_eq!(DefaultExportMatcher.find(source), Some("{\n  name: 'x'\n}"));
    }

    #[test]
    fn test_script_keeps_inner_semicolons() {
        let source = "<script>export default {\n  mounted() { this.a = 1; this.b = `x`; }\n};</script>";
        let script = DefaultExportMatcher.find(source).unwrap();
        assert_eq!(script, "{\n  mounted() { this.a = 1; this.b = `x`; }\n}");
    }

    #[test]
    fn test_script_ignores_inner_closing_brace() {
        let source = "<script>\nexport default {\n  data() {\n    return { msg: 'hi' };\n  }\n};\n</script>";
        let script = DefaultExportMatcher.find(source).unwrap();
        assert_eq!(script, "{\n  data() {\n    return { msg: 'hi' };\n  }\n}");
    }

    #[test]
    fn test_script_with_imports_does_not_match() {
        let source = "<script>\nimport Foo from './Foo'\nexport default { components: { Foo } };\n</script>";
        assert_eq!(DefaultExportMatcher.find(source), None);
    }

    #[test]
    fn test_empty_template_is_present() {
        let source = "<template></template><script>export default {};</script>";
        let sections = SectionExtractor::new().extract(source);
        assert_eq!(sections.template, Some(""));
        assert_eq!(sections.script, Some("{}"));
        assert!(sections.is_complete());
    }

    #[test]
    fn test_missing_template() {
        let source = "<script>export default { name: 'x' };</script>";
        let err = SectionExtractor::new().extract(source).require().unwrap_err();
        assert!(matches!(
            err,
            SfcJsError::MissingSection {
                section: Section::Template
            }
        ));
    }

    #[test]
    fn test_missing_script() {
        let source = "<template><div></div></template>";
        let err = SectionExtractor::new().extract(source).require().unwrap_err();
        assert!(matches!(
            err,
            SfcJsError::MissingSection {
                section: Section::Script
            }
        ));
    }

    #[test]
    fn test_script_without_default_export() {
        let source = "<template><div></div></template><script>const x = 1;</script>";
        let sections = SectionExtractor::new().extract(source);
        assert!(!sections.is_complete());
        assert!(matches!(
            sections.require().unwrap_err(),
            SfcJsError::MalformedScript
        ));
    }

    #[test]
    fn test_script_without_semicolon_is_malformed() {
        let source = "<template><div></div></template><script>export default { name: 'x' }</script>";
        assert!(matches!(
            SectionExtractor::new().extract(source).require().unwrap_err(),
            SfcJsError::MalformedScript
        ));
    }

    #[test]
    fn test_custom_matcher() {
        struct Fixed;

        impl SectionMatcher for Fixed {
            fn find<'a>(&self, _source: &'a str) -> Option<&'a str> {
                Some("<span/>")
            }
        }

        let extractor = SectionExtractor::new().with_template_matcher(Fixed);
        let (template, script) = extractor.extract(BASIC).require().unwrap();
        assert_eq!(template, "<span/>");
        assert!(script.contains("name: 'Basic'"));
    }
}
