use confluence_mcp::markup::*;
use speculate2::speculate;

/// Concatenate the CDATA sections inside the macro body, the way an XML
/// parser reads them back.
fn read_back(fragment: &str) -> String {
    let start = fragment
        .find("<ac:plain-text-body>")
        .expect("missing body start")
        + "<ac:plain-text-body>".len();
    let end = fragment
        .rfind("</ac:plain-text-body>")
        .expect("missing body end");
    let mut rest = &fragment[start..end];

    let mut text = String::new();
    while let Some(open) = rest.find("<![CDATA[") {
        assert!(rest[..open].is_empty(), "text outside CDATA: {:?}", &rest[..open]);
        rest = &rest[open + "<![CDATA[".len()..];
        let close = rest.find("]]>").expect("unterminated CDATA section");
        text.push_str(&rest[..close]);
        rest = &rest[close + "]]>".len()..];
    }
    assert!(rest.is_empty(), "trailing text after CDATA: {:?}", rest);
    text
}

fn language_param(fragment: &str) -> Option<String> {
    let marker = r#"<ac:parameter ac:name="language">"#;
    let start = fragment.find(marker)? + marker.len();
    let end = fragment[start..].find("</ac:parameter>")? + start;
    Some(fragment[start..end].to_string())
}

speculate! {
    describe "build_code_macro" {
        it "renders the full fragment for a known language" {
            let fragment = build_code_macro(&CodeBlock::new("let x = 1;").language("RUST"));

            assert_eq!(
                fragment,
                concat!(
                    r#"<ac:structured-macro ac:name="code">"#,
                    r#"<ac:parameter ac:name="language">rust</ac:parameter>"#,
                    r#"<ac:parameter ac:name="linenumbers">false</ac:parameter>"#,
                    r#"<ac:parameter ac:name="collapse">false</ac:parameter>"#,
                    "<ac:plain-text-body><![CDATA[let x = 1;]]></ac:plain-text-body>",
                    "</ac:structured-macro>"
                )
            );
        }

        it "always emits both flags in order after the language" {
            let fragment = build_code_macro(
                &CodeBlock::new("x").language("py").line_numbers(true).collapse(true),
            );

            let language = fragment.find(r#"ac:name="language""#).unwrap();
            let line_numbers = fragment.find(r#"<ac:parameter ac:name="linenumbers">true</ac:parameter>"#).unwrap();
            let collapse = fragment.find(r#"<ac:parameter ac:name="collapse">true</ac:parameter>"#).unwrap();
            assert!(language < line_numbers);
            assert!(line_numbers < collapse);
        }

        it "handles empty code" {
            let fragment = build_code_macro(&CodeBlock::default());

            assert!(fragment.contains("<![CDATA[]]>"));
            assert_eq!(read_back(&fragment), "");
        }

        it "is deterministic" {
            let block = CodeBlock::new("a ]]> b").language("ts").collapse(true);
            assert_eq!(build_code_macro(&block), build_code_macro(&block));
        }
    }

    describe "cdata safety" {
        it "splits a single terminator" {
            assert_eq!(escape_cdata("a]]>b"), "a]]]]><![CDATA[>b");
        }

        it "reads back text containing terminators" {
            let inputs = [
                "]]>",
                "]]>]]>",
                "]]]>",
                "]]]]>>",
                "if (a[b[0]]>1) { return; }",
                "<![CDATA[ nested ]]> text ]]",
                "no terminator at all",
            ];

            for input in inputs {
                let fragment = build_code_macro(&CodeBlock::new(input));
                assert_eq!(read_back(&fragment), input, "input {:?}", input);
            }
        }

        it "leaves no raw terminator inside a section" {
            let fragment = build_code_macro(&CodeBlock::new("]]>]]>]]>"));
            let body_sections = fragment.matches("<![CDATA[").count();
            let terminators = fragment.matches("]]>").count();
            assert_eq!(body_sections, terminators);
        }
    }

    describe "language normalization" {
        it "resolves aliases case-insensitively" {
            assert_eq!(normalize_language(Some("JS")), Some("javascript"));
            assert_eq!(normalize_language(Some("YML")), Some("yaml"));
            assert_eq!(normalize_language(Some("Shell")), Some("bash"));
            assert_eq!(normalize_language(Some("zsh")), Some("bash"));
            assert_eq!(normalize_language(Some("golang")), Some("go"));
            assert_eq!(normalize_language(Some("ps")), Some("powershell"));
            assert_eq!(normalize_language(Some("tsx")), Some("typescript"));
        }

        it "trims surrounding whitespace" {
            assert_eq!(normalize_language(Some("  Py \n")), Some("python"));
        }

        it "accepts canonical names directly" {
            assert_eq!(normalize_language(Some("Kotlin")), Some("kotlin"));
            assert_eq!(normalize_language(Some("plaintext")), Some("plaintext"));
        }

        it "rejects unknown and empty hints" {
            assert_eq!(normalize_language(None), None);
            assert_eq!(normalize_language(Some("")), None);
            assert_eq!(normalize_language(Some("   ")), None);
            assert_eq!(normalize_language(Some("brainfuck")), None);
            assert_eq!(normalize_language(Some("java script")), None);
        }

        it "omits the language parameter for unknown hints" {
            let fragment = build_code_macro(&CodeBlock::new("x").language("cobol"));

            assert_eq!(language_param(&fragment), None);
            assert!(fragment.starts_with(
                r#"<ac:structured-macro ac:name="code"><ac:parameter ac:name="linenumbers">"#
            ));
        }

        it "writes the canonical lowercase value" {
            let fragment = build_code_macro(&CodeBlock::new("x").language("JS"));
            assert_eq!(language_param(&fragment).as_deref(), Some("javascript"));
        }
    }
}
