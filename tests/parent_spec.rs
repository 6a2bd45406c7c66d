//! Parent resolution tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use confluence_mcp::models::Page;
use confluence_mcp::parent::*;

async fn never_called(_space: String, _title: String) -> Result<Option<Page>, io::Error> {
    panic!("lookup must not be called");
}

fn request() -> ParentRequest {
    ParentRequest {
        space: "SPACE".to_string(),
        ..Default::default()
    }
}

mod explicit_choices {
    use super::*;

    #[tokio::test]
    async fn root_flag_wins_over_parent_id() {
        let req = ParentRequest {
            at_root: Some(true),
            parent_id: Some("123".to_string()),
            parent_title: Some("Roadmap".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, never_called).await.expect("resolve failed");

        assert_eq!(result, ParentResolution::Resolved { parent_id: None });
    }

    #[tokio::test]
    async fn parent_id_is_used_without_lookup() {
        let req = ParentRequest {
            parent_id: Some("42".to_string()),
            parent_title: Some("Roadmap".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, never_called).await.expect("resolve failed");

        assert_eq!(
            result,
            ParentResolution::Resolved {
                parent_id: Some("42".to_string())
            }
        );
    }

    #[tokio::test]
    async fn root_flag_false_does_not_count_as_a_choice() {
        let req = ParentRequest {
            at_root: Some(false),
            ..request()
        };

        let result = resolve_parent(&req, never_called).await.expect("resolve failed");

        assert!(matches!(result, ParentResolution::NeedsClarification { .. }));
    }

    #[tokio::test]
    async fn blank_parent_id_is_absent() {
        let req = ParentRequest {
            parent_id: Some("   ".to_string()),
            parent_title: Some(" \t".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, never_called).await.expect("resolve failed");

        assert!(matches!(result, ParentResolution::NeedsClarification { .. }));
    }

    #[tokio::test]
    async fn parent_id_is_trimmed() {
        let req = ParentRequest {
            parent_id: Some(" 42 ".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, never_called).await.expect("resolve failed");

        assert_eq!(
            result,
            ParentResolution::Resolved {
                parent_id: Some("42".to_string())
            }
        );
    }
}

mod by_title {
    use super::*;

    #[tokio::test]
    async fn looks_up_the_trimmed_title() {
        let req = ParentRequest {
            parent_title: Some("  Roadmap ".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, |_, title| async move {
            assert_eq!(title, "Roadmap");
            Ok::<_, io::Error>(Some(Page {
                id: "7".to_string(),
                ..Default::default()
            }))
        })
        .await
        .expect("resolve failed");

        assert_eq!(
            result,
            ParentResolution::Resolved {
                parent_id: Some("7".to_string())
            }
        );
    }

    #[tokio::test]
    async fn resolves_found_page_to_its_id() {
        let req = ParentRequest {
            parent_title: Some("Roadmap".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, |space, title| async move {
            assert_eq!(space, "SPACE");
            assert_eq!(title, "Roadmap");
            Ok::<_, io::Error>(Some(Page {
                id: "99".to_string(),
                title,
                ..Default::default()
            }))
        })
        .await
        .expect("resolve failed");

        assert_eq!(
            result,
            ParentResolution::Resolved {
                parent_id: Some("99".to_string())
            }
        );
    }

    #[tokio::test]
    async fn missing_page_is_a_hard_failure() {
        let req = ParentRequest {
            parent_title: Some("Ghost".to_string()),
            ..request()
        };

        let err = resolve_parent(&req, |_, _| async { Ok::<_, io::Error>(None) })
            .await
            .expect_err("expected failure");

        assert!(matches!(err, ResolveError::ParentNotFound { .. }));
        let message = err.to_string();
        assert!(message.contains("Ghost"));
        assert!(message.contains("SPACE"));
    }

    #[tokio::test]
    async fn lookup_errors_are_not_reported_as_not_found() {
        let req = ParentRequest {
            parent_title: Some("Roadmap".to_string()),
            ..request()
        };

        let err = resolve_parent(&req, |_, _| async {
            Err::<Option<Page>, _>(io::Error::new(io::ErrorKind::Other, "connection reset"))
        })
        .await
        .expect_err("expected failure");

        match err {
            ResolveError::Lookup(e) => assert_eq!(e.to_string(), "connection reset"),
            other => panic!("expected lookup error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn lookup_runs_exactly_once() {
        let calls = AtomicUsize::new(0);
        let req = ParentRequest {
            parent_title: Some("Roadmap".to_string()),
            ..request()
        };

        resolve_parent(&req, |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok::<_, io::Error>(Some(Page {
                    id: "7".to_string(),
                    ..Default::default()
                }))
            }
        })
        .await
        .expect("resolve failed");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_parent_id_falls_through_to_title() {
        let req = ParentRequest {
            parent_id: Some(String::new()),
            parent_title: Some("Roadmap".to_string()),
            ..request()
        };

        let result = resolve_parent(&req, |_, _| async {
            Ok::<_, io::Error>(Some(Page {
                id: "99".to_string(),
                ..Default::default()
            }))
        })
        .await
        .expect("resolve failed");

        assert_eq!(
            result,
            ParentResolution::Resolved {
                parent_id: Some("99".to_string())
            }
        );
    }
}

mod clarification {
    use super::*;

    #[tokio::test]
    async fn asks_when_nothing_is_given() {
        let result = resolve_parent(&request(), never_called)
            .await
            .expect("resolve failed");

        let ParentResolution::NeedsClarification { prompt } = result else {
            panic!("expected clarification, got {:?}", result);
        };
        assert!(prompt.contains("confluence_search_pages"));
    }

    #[tokio::test]
    async fn lists_options_in_preference_order() {
        let req = ParentRequest {
            parent_id: Some(String::new()),
            parent_title: Some(String::new()),
            ..request()
        };

        let result = resolve_parent(&req, never_called).await.expect("resolve failed");

        let ParentResolution::NeedsClarification { prompt } = result else {
            panic!("expected clarification");
        };
        let by_id = prompt.find("parentId").expect("id option missing");
        let by_title = prompt.find("parentTitle").expect("title option missing");
        let at_root = prompt.find("atRoot=true").expect("root option missing");
        assert!(by_id < by_title);
        assert!(by_title < at_root);
    }
}
