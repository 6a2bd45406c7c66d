use std::fs;

use confluence_mcp::templates::*;
use speculate2::speculate;

speculate! {
    before {
        let custom = tempfile::tempdir().expect("Failed to create temp dir");
        let builtin = tempfile::tempdir().expect("Failed to create temp dir");
        let store = TemplateStore::new(Some(custom.path().to_path_buf()), builtin.path());
    }

    describe "list" {
        it "returns nothing when the directories do not exist" {
            let missing = custom.path().join("missing");
            let store = TemplateStore::new(Some(missing.clone()), missing.join("builtin"));

            assert!(store.list().is_empty());
        }

        it "lists html files sorted by name" {
            fs::write(builtin.path().join("zeta.html"), "z").unwrap();
            fs::write(builtin.path().join("alpha.html"), "a").unwrap();
            fs::write(builtin.path().join("notes.txt"), "ignored").unwrap();

            let names: Vec<String> = store.list().into_iter().map(|t| t.name).collect();

            assert_eq!(names, vec!["alpha", "zeta"]);
        }

        it "lets the custom directory shadow builtin templates" {
            fs::write(custom.path().join("report.html"), "custom").unwrap();
            fs::write(builtin.path().join("report.html"), "builtin").unwrap();
            fs::write(builtin.path().join("meeting.html"), "builtin").unwrap();

            let templates = store.list();

            assert_eq!(templates.len(), 2);
            let report = templates.iter().find(|t| t.name == "report").unwrap();
            assert_eq!(report.source, TemplateSource::Custom);
            let meeting = templates.iter().find(|t| t.name == "meeting").unwrap();
            assert_eq!(meeting.source, TemplateSource::Builtin);
        }
    }

    describe "load" {
        it "prefers the custom directory" {
            fs::write(custom.path().join("report.html"), "<p>custom</p>").unwrap();
            fs::write(builtin.path().join("report.html"), "<p>builtin</p>").unwrap();

            assert_eq!(store.load("report").unwrap(), "<p>custom</p>");
        }

        it "falls back to the builtin directory" {
            fs::write(builtin.path().join("meeting.html"), "<h1>Minutes</h1>").unwrap();

            assert_eq!(store.load("meeting").unwrap(), "<h1>Minutes</h1>");
        }

        it "fails for unknown templates" {
            let err = store.load("nope").unwrap_err();
            assert!(matches!(err, TemplateError::NotFound(ref name) if name == "nope"));
        }

        it "rejects names that escape the template directory" {
            for name in ["", "  ", "../secret", "a/b", "a\\b"] {
                let err = store.load(name).unwrap_err();
                assert!(matches!(err, TemplateError::InvalidName(_)), "name {:?}", name);
            }
        }
    }

    describe "save" {
        it "writes into the custom directory when configured" {
            let saved = store.save("design", "<p>doc</p>").unwrap();

            assert_eq!(saved.directory, custom.path());
            assert_eq!(fs::read_to_string(custom.path().join("design.html")).unwrap(), "<p>doc</p>");
            assert_eq!(store.load("design").unwrap(), "<p>doc</p>");
        }

        it "creates the builtin directory when no custom one is set" {
            let target = builtin.path().join("nested").join("templates");
            let store = TemplateStore::new(None, target.clone());

            let saved = store.save("design", "<p>doc</p>").unwrap();

            assert_eq!(saved.path, target.join("design.html"));
            assert!(saved.path.exists());
        }

        it "overwrites an existing template" {
            store.save("design", "v1").unwrap();
            store.save("design", "v2").unwrap();

            assert_eq!(store.load("design").unwrap(), "v2");
        }
    }
}
