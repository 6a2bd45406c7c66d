//! Storage-format code macro builder.
//!
//! Confluence renders source code through the `code` structured macro. Two
//! things break that macro in practice: a `]]>` inside the code (it closes the
//! CDATA body early) and a `language` value the server's renderer does not
//! know (it fails the whole macro with `InvalidValueException`). The builder
//! splits every terminator across CDATA sections and drops any language it
//! cannot map onto a known-safe identifier, so its output is always valid.

/// Terminator of a CDATA section.
const CDATA_END: &str = "]]>";

/// Closes the current section right after `]]` and reopens a new one for `>`.
const CDATA_END_ESCAPED: &str = "]]]]><![CDATA[>";

/// Common aliases mapped onto their canonical language identifier.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("node", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    ("yml", "yaml"),
    ("py", "python"),
    ("golang", "go"),
    ("ps", "powershell"),
];

/// Languages every supported server version renders. Kept sorted.
const KNOWN_LANGUAGES: &[&str] = &[
    "bash",
    "c",
    "cpp",
    "csharp",
    "css",
    "diff",
    "go",
    "groovy",
    "html",
    "ini",
    "java",
    "javascript",
    "json",
    "kotlin",
    "lua",
    "makefile",
    "objectivec",
    "perl",
    "php",
    "plaintext",
    "powershell",
    "python",
    "ruby",
    "rust",
    "scala",
    "sql",
    "swift",
    "typescript",
    "xml",
    "yaml",
];

/// A block of source code to embed in a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    /// Raw code, embedded byte-for-byte.
    pub code: String,
    /// Language hint, case-insensitive, aliases allowed.
    pub language: Option<String>,
    pub line_numbers: bool,
    pub collapse: bool,
}

impl CodeBlock {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn line_numbers(mut self, enabled: bool) -> Self {
        self.line_numbers = enabled;
        self
    }

    pub fn collapse(mut self, enabled: bool) -> Self {
        self.collapse = enabled;
        self
    }
}

/// Make `text` safe to place between `<![CDATA[` and `]]>`.
///
/// Every `]]>` becomes `]]]]><![CDATA[>`; a parser concatenating the
/// resulting sections reads back the original text.
pub fn escape_cdata(text: &str) -> String {
    text.replace(CDATA_END, CDATA_END_ESCAPED)
}

/// Map a language hint onto a known-safe identifier.
///
/// Returns `None` for empty or unrecognised hints. Callers must then omit
/// the language parameter entirely rather than pass the raw hint through.
pub fn normalize_language(hint: Option<&str>) -> Option<&'static str> {
    let raw = hint?.trim().to_lowercase();
    if raw.is_empty() {
        return None;
    }

    let canonical = LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map_or(raw.as_str(), |(_, target)| *target);

    KNOWN_LANGUAGES
        .binary_search(&canonical)
        .ok()
        .map(|idx| KNOWN_LANGUAGES[idx])
}

/// Render a code block as a storage-format `code` macro.
///
/// Parameters are emitted in a fixed order: `language` (only when it
/// normalizes), `linenumbers`, `collapse`.
pub fn build_code_macro(block: &CodeBlock) -> String {
    let mut out = String::from(r#"<ac:structured-macro ac:name="code">"#);

    if let Some(language) = normalize_language(block.language.as_deref()) {
        push_parameter(&mut out, "language", language);
    }
    push_parameter(&mut out, "linenumbers", bool_str(block.line_numbers));
    push_parameter(&mut out, "collapse", bool_str(block.collapse));

    out.push_str("<ac:plain-text-body><![CDATA[");
    out.push_str(&escape_cdata(&block.code));
    out.push_str("]]></ac:plain-text-body>");
    out.push_str("</ac:structured-macro>");
    out
}

fn push_parameter(out: &mut String, name: &str, value: &str) {
    out.push_str(r#"<ac:parameter ac:name=""#);
    out.push_str(name);
    out.push_str(r#"">"#);
    out.push_str(value);
    out.push_str("</ac:parameter>");
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
