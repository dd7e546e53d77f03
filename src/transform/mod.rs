//! Extraction and reassembly of single-file components.
//!
//! A component document is reduced to two regions, the template markup and
//! the default-exported object literal, which are recombined into a
//! registry assignment:
//!
//! ```text
//! window.VueComponents = window.VueComponents || {};
//! window.VueComponents['Name'] = { ...script properties,
//! template: `...markup...`
//! };
//! ```

pub mod emit;
pub mod sections;

pub use emit::{escape_backticks, validate_component_name, RegistryEmitter, DEFAULT_REGISTRY};
pub use sections::{
    DefaultExportMatcher, ExtractedSections, SectionExtractor, SectionMatcher, TemplateMatcher,
};

use crate::error::Result;

/// Pure source-to-source transform. Holds no per-call state.
pub struct SfcTransform {
    extractor: SectionExtractor,
    emitter: RegistryEmitter,
}

impl SfcTransform {
    pub fn new() -> Self {
        Self {
            extractor: SectionExtractor::new(),
            emitter: RegistryEmitter::default(),
        }
    }

    pub fn with_registry<S: Into<String>>(mut self, registry: S) -> Self {
        self.emitter = RegistryEmitter::new(registry);
        self
    }

    pub fn with_extractor(mut self, extractor: SectionExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn registry(&self) -> &str {
        self.emitter.registry()
    }

    /// Compile one component. Fails without output when either section is
    /// missing or the script is not `export default { ... };`.
    pub fn compile(&self, source: &str, component_name: &str) -> Result<String> {
        let (template, script) = self.extractor.extract(source).require()?;
        self.emitter.emit(component_name, script, template)
    }
}

impl Default for SfcTransform {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile with the default registry.
pub fn compile_component(source: &str, component_name: &str) -> Result<String> {
    SfcTransform::new().compile(source, component_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Section, SfcJsError};

    /// Top-level property names of the first object literal in `code`.
    fn top_level_keys(code: &str) -> Vec<String> {
        let start = code.find("= {").expect("object literal") + 2;
        let mut keys = Vec::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut expect_key = false;
        let mut chars = code[start..].chars().peekable();

        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '\'' | '"' | '`' => quote = Some(c),
                '{' | '[' | '(' => {
                    depth += 1;
                    if depth == 1 {
                        expect_key = true;
                    }
                }
                '}' | ']' | ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                ',' if depth == 1 => expect_key = true,
                c if depth == 1 && expect_key && (c.is_alphabetic() || c == '_' || c == '$') => {
                    let mut word = c.to_string();
                    while let Some(&n) = chars.peek() {
                        if n.is_alphanumeric() || n == '_' || n == '$' {
                            word.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if word == "async" {
                        continue;
                    }
                    keys.push(word);
                    expect_key = false;
                }
                _ => {}
            }
        }

        keys
    }

    fn template_literal(output: &str) -> String {
        let start = output.find("template: `").expect("template property") + "template: `".len();
        let end = output.rfind("`\n};").expect("closing backtick");
        output[start..end].replace("\\`", "`")
    }

    #[test]
    fn test_basic_conversion() {
        let source = "<template>\n  <div class=\"hello\">\n    <h1>{{ msg }}</h1>\n  </div>\n</template>\n\n<script>\nexport default {\n  data() {\n    return {\n      msg: 'Hello World'\n    }\n  }\n};\n</script>";

        let result = compile_component(source, "HelloWorld").unwrap();

        assert!(result.contains("window.VueComponents = window.VueComponents || {};"));
        assert!(result.contains("window.VueComponents['HelloWorld']"));
        assert!(result.contains("data() {"));
        assert!(result.contains("msg: 'Hello World'"));
        assert!(result.contains("template: `"));
        assert!(result.contains("<div class=\"hello\">"));
        assert!(result.contains("{{ msg }}"));
    }

    #[test]
    fn test_single_line_component() {
        let source = "<template><div>{{ msg }}</div></template><script>export default { data(){ return { msg: 'hi' } } };</script>";

        let result = compile_component(source, "HelloWorld").unwrap();
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines[0], "window.VueComponents = window.VueComponents || {};");
        assert!(lines[1].starts_with("window.VueComponents['HelloWorld'] = "));
        assert!(result.contains("data(){ return { msg: 'hi' } },\ntemplate: `<div>{{ msg }}</div>`"));
        assert!(result.ends_with("};"));
    }

    #[test]
    fn test_template_placed_inside_object() {
        let source = "<template>\n  <div>Content</div>\n</template>\n\n<script>\nexport default {\n  data() {\n    return { count: 0 }\n  }\n};\n</script>";

        let result = compile_component(source, "Counter").unwrap();

        let object_start = result.find("= {").unwrap();
        let template_pos = result.find("template: `").unwrap();
        let object_end = result.rfind("};").unwrap();
        assert!(object_start < template_pos);
        assert!(template_pos < object_end);
        assert_eq!(top_level_keys(&result), vec!["data", "template"]);
    }

    #[test]
    fn test_trailing_whitespace_after_script() {
        let source = "<template>\n  <div>Test</div>\n</template>\n\n<script>\nexport default {\n  name: 'WhitespaceTest'\n};   \n</script>";

        let result = compile_component(source, "WhitespaceTest").unwrap();

        assert!(result.contains("name: 'WhitespaceTest',\ntemplate: `"));
        assert!(!result.contains("},\ntemplate:"));
    }

    #[test]
    fn test_nested_objects_keep_their_braces() {
        let source = "<template>\n  <div>{{ config.nested.value }}</div>\n</template>\n\n<script>\nexport default {\n  data() {\n    return {\n      config: {\n        nested: {\n          value: 'test',\n          deep: {\n            property: 123\n          }\n        }\n      }\n    }\n  }\n};\n</script>";

        let result = compile_component(source, "NestedObject").unwrap();

        assert!(result.contains("deep: {"));
        assert!(result.contains("property: 123"));
        let opens = result.matches('{').count();
        let closes = result.matches('}').count();
        assert_eq!(opens, closes);
        assert_eq!(top_level_keys(&result), vec!["data", "template"]);
    }

    #[test]
    fn test_async_hooks_and_computed() {
        let source = "<template>\n  <div class=\"wrapper\">\n    <span>Loading...</span>\n  </div>\n</template>\n\n<script>\nexport default {\n  props: {\n    id: String\n  },\n  data: function () {\n    return {\n      loading: true\n    }\n  },\n  methods: {\n    async fetchData() {\n      return await fetch('/api/data')\n    }\n  },\n  async mounted() {\n    await this.fetchData()\n    this.loading = false\n  },\n  computed: {\n    isReady() {\n      return !this.loading\n    }\n  }\n};\n</script>";

        let result = compile_component(source, "AsyncComponent").unwrap();

        assert!(result.contains("async mounted()"));
        assert!(result.contains("async fetchData()"));
        assert_eq!(
            top_level_keys(&result),
            vec!["props", "data", "methods", "mounted", "computed", "template"]
        );
    }

    #[test]
    fn test_backticks_are_escaped() {
        let source = "<template>\n  <div>Use `backticks` for `code`</div>\n</template>\n\n<script>\nexport default {\n  name: 'CodeExample'\n};\n</script>";

        let result = compile_component(source, "CodeExample").unwrap();
        let start = result.find("template: `").unwrap() + "template: `".len();
        let end = result.rfind("`\n};").unwrap();
        let embedded = &result[start..end];

        assert!(result.contains("Use \\`backticks\\` for \\`code\\`"));
        assert_eq!(embedded.matches("\\`").count(), 4);
        assert_eq!(embedded.replace("\\`", "").matches('`').count(), 0);
    }

    #[test]
    fn test_template_value_round_trips() {
        let markup = "\n  <div class=\"loader-wrap\">\n    <svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\">\n      <path d=\"M10,20 L30,40\" fill=\"#fad022\"></path>\n    </svg>\n    <p>Line with \"quotes\", 'apostrophes' and `ticks`</p>\n  </div>\n";
        let source = format!(
            "<template>{}</template>\n\n<script>\nexport default {{\n  name: 'SvgLoader'\n}};\n</script>",
            markup
        );

        let result = compile_component(&source, "SvgLoader").unwrap();
        assert_eq!(template_literal(&result), markup);
    }

    #[test]
    fn test_empty_sections_component() {
        let source = "<template>\n  <div>Empty sections</div>\n</template>\n\n<script>\nexport default {\n  props: {\n    \n  },\n  methods: {\n   \n  },\n  computed: {\n    \n  }\n};\n</script>";

        let result = compile_component(source, "EmptySections").unwrap();
        assert_eq!(
            top_level_keys(&result),
            vec!["props", "methods", "computed", "template"]
        );
    }

    #[test]
    fn test_empty_object_literal() {
        let source = "<template><p>hi</p></template><script>export default {};</script>";
        let result = compile_component(source, "Bare").unwrap();

        assert!(result.contains("['Bare'] = {\ntemplate: `<p>hi</p>`\n};"));
        assert_eq!(top_level_keys(&result), vec!["template"]);
    }

    #[test]
    fn test_trailing_comma_is_not_doubled() {
        let source = "<template><p/></template><script>export default {\n  name: 'Trailing',\n};</script>";
        let result = compile_component(source, "Trailing").unwrap();

        assert!(result.contains("name: 'Trailing',\ntemplate: `<p/>`"));
        assert!(!result.contains(",,"));
    }

    #[test]
    fn test_failures_produce_no_output() {
        let cases = [
            ("<script>export default { a: 1 };</script>", "template"),
            ("<template><div></div></template>", "script"),
            ("<template><div></div></template><script>module.exports = {}</script>", "shape"),
        ];

        for (source, expected) in cases {
            let err = compile_component(source, "Broken").unwrap_err();
            let ok = match (expected, &err) {
                ("template", SfcJsError::MissingSection { section: Section::Template }) => true,
                ("script", SfcJsError::MissingSection { section: Section::Script }) => true,
                ("shape", SfcJsError::MalformedScript) => true,
                _ => false,
            };
            assert!(ok, "unexpected error for {}: {:?}", expected, err);
        }
    }

    #[test]
    fn test_trailing_line_comment_keeps_separator_outside() {
        let source = "<template><p/></template><script>export default {\n  name: 'x' // keep\n};</script>";
        let result = compile_component(source, "X").unwrap();

        assert!(!result.contains("// keep,"));
        assert!(result.contains("name: 'x' // keep\n,\ntemplate: `<p/>`\n};"));
        assert_eq!(top_level_keys(&result), vec!["name", "template"]);
    }

    #[test]
    fn test_replacement_script_matcher() {
        struct SetupObject;

        impl SectionMatcher for SetupObject {
            fn find<'a>(&self, source: &'a str) -> Option<&'a str> {
                let start = source.find("defineComponent(")? + "defineComponent(".len();
                let end = source.rfind(')')?;
                source.get(start..end)
            }
        }

        let transform = SfcTransform::new()
            .with_extractor(SectionExtractor::new().with_script_matcher(SetupObject));
        let source = "<template><b/></template><script>export default defineComponent({ name: 'Tag' })</script>";

        let result = transform.compile(source, "Tag").unwrap();
        assert!(result.contains("['Tag'] = { name: 'Tag',\ntemplate: `<b/>`\n};"));
    }

    #[test]
    fn test_custom_registry_expression() {
        let transform = SfcTransform::new().with_registry("self.Registry");
        let result = transform
            .compile("<template></template><script>export default { a: 1 };</script>", "A")
            .unwrap();

        assert_eq!(transform.registry(), "self.Registry");
        assert!(result.starts_with("self.Registry = self.Registry || {};\nself.Registry['A'] = "));
    }
}
