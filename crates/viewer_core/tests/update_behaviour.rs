use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use viewer_core::{
    update, AppState, Effect, ExportJob, ExportNotice, ExportResultKind, ImageFormat, Msg,
    QueryErrorKind, QueryRequest, StatusView, ViewKind,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(viewer_logging::initialize_for_tests);
}

fn submit(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::Submitted)
}

fn opportunity_data(title: &str) -> serde_json::Value {
    json!({
        "opportunity": {
            "id": "12345",
            "project_description": "Build wells.\n",
            "host_lc": { "name": "Nairobi" },
            "home_mc": { "name": "Kenya" },
            "project": {
                "project_name": title,
                "sdg_info": { "sdg_target": [{ "target_id": "6.1" }, { "target_id": "6.2" }] }
            },
            "branch": { "company": { "name": "WaterCo" } },
            "location": "Nairobi",
            "cover_photo": null
        }
    })
}

fn loaded_state() -> AppState {
    let (state, _) = submit(AppState::new(ViewKind::Opportunity), "12345");
    let (state, _) = update(
        state,
        Msg::QuerySucceeded {
            seq: 1,
            data: opportunity_data("Clean Water"),
        },
    );
    state
}

#[test]
fn submit_emits_query_and_enters_loading() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(ViewKind::Opportunity), "  12345 ");

    assert_eq!(
        effects,
        vec![Effect::RunQuery {
            seq: 1,
            request: QueryRequest::Opportunity {
                id: "12345".to_string()
            },
        }]
    );
    assert_eq!(state.view().status, StatusView::Loading);
    assert!(state.consume_dirty());
}

#[test]
fn empty_identifier_does_not_dispatch() {
    init_logging();
    let (state, effects) = submit(AppState::new(ViewKind::Opportunity), "   ");

    assert!(effects.is_empty());
    assert_eq!(state.view().status, StatusView::Idle);
    assert!(!state.view().can_submit);
}

#[test]
fn post_view_queries_by_topic() {
    init_logging();
    let (state, effects) = submit(AppState::new(ViewKind::Post), "climate");

    assert_eq!(
        effects,
        vec![Effect::RunQuery {
            seq: 1,
            request: QueryRequest::Post {
                topic: "climate".to_string()
            },
        }]
    );

    let (state, _) = update(
        state,
        Msg::QuerySucceeded {
            seq: 1,
            data: json!({ "post": { "title": "T", "content": "C", "image": "https://x/y.png" } }),
        },
    );
    let card = state.view().card.expect("card");
    assert_eq!(card.title, "T");
    assert_eq!(card.description, "C");
}

#[test]
fn success_builds_display_model() {
    init_logging();
    let view = loaded_state().view();

    assert_eq!(view.status, StatusView::Ready);
    let card = view.card.expect("card");
    assert_eq!(card.title, "Clean Water");
    assert_eq!(card.sdg_targets, "6.1, 6.2");
    assert_eq!(card.image_url, None);
    assert!(view.can_export);
}

#[test]
fn later_request_wins_when_earlier_resolves_last() {
    init_logging();
    let (state, first) = submit(AppState::new(ViewKind::Opportunity), "111");
    let (state, second) = submit(state, "222");
    assert!(matches!(first[0], Effect::RunQuery { seq: 1, .. }));
    assert!(matches!(second[0], Effect::RunQuery { seq: 2, .. }));

    let (state, _) = update(
        state,
        Msg::QuerySucceeded {
            seq: 2,
            data: opportunity_data("Second"),
        },
    );
    let (mut state, effects) = update(
        state,
        Msg::QuerySucceeded {
            seq: 1,
            data: opportunity_data("First"),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().card.unwrap().title, "Second");
    assert_eq!(state.view().status, StatusView::Ready);
    state.consume_dirty();

    // A stale failure must not clear the newer card either.
    let (mut state, _) = update(
        state,
        Msg::QueryFailed {
            seq: 1,
            kind: QueryErrorKind::Network,
            message: "late".to_string(),
        },
    );
    assert_eq!(state.view().card.unwrap().title, "Second");
    assert!(!state.consume_dirty());
}

#[test]
fn stale_response_while_newer_is_loading_is_dropped() {
    init_logging();
    let (state, _) = submit(AppState::new(ViewKind::Opportunity), "111");
    let (state, _) = submit(state, "222");
    let (state, _) = update(
        state,
        Msg::QuerySucceeded {
            seq: 1,
            data: opportunity_data("First"),
        },
    );

    assert_eq!(state.view().status, StatusView::Loading);
    assert_eq!(state.view().card, None);
}

#[test]
fn failure_shows_message_and_clears_card() {
    init_logging();
    let state = loaded_state();
    let (state, _) = update(state, Msg::Submitted);
    let (state, _) = update(
        state,
        Msg::QueryFailed {
            seq: 2,
            kind: QueryErrorKind::HttpStatus(401),
            message: "401 Unauthorized".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(
        view.status,
        StatusView::Error {
            message: "401 Unauthorized".to_string()
        }
    );
    assert_eq!(view.card, None);
    assert!(!view.can_export);
}

#[test]
fn null_root_field_is_reported_as_not_found() {
    init_logging();
    let (state, _) = submit(AppState::new(ViewKind::Opportunity), "404");
    let (state, _) = update(
        state,
        Msg::QuerySucceeded {
            seq: 1,
            data: json!({ "opportunity": null }),
        },
    );

    assert_eq!(
        state.view().status,
        StatusView::Error {
            message: "no opportunity found for '404'".to_string()
        }
    );
}

#[test]
fn copy_emits_labeled_text() {
    init_logging();
    let (_state, effects) = update(loaded_state(), Msg::CopyClicked);

    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            text: "Project: Clean Water\nLocation: Nairobi\nCompany: WaterCo\nHost LC: Nairobi\nHome MC: Kenya\n\nBuild wells."
                .to_string()
        }]
    );
}

#[test]
fn copy_without_card_does_nothing() {
    init_logging();
    let (_state, effects) = update(AppState::new(ViewKind::Opportunity), Msg::CopyClicked);
    assert!(effects.is_empty());
}

#[test]
fn export_uses_identifier_of_displayed_card() {
    init_logging();
    let state = loaded_state();
    // Editing the input after the fetch must not rename the download.
    let (state, _) = update(state, Msg::InputChanged("99999".to_string()));
    let (state, effects) = update(
        state,
        Msg::ExportClicked {
            format: ImageFormat::Png,
        },
    );

    match effects.as_slice() {
        [Effect::ExportSnapshot {
            job: ExportJob {
                format,
                filename_base,
                card,
            },
        }] => {
            assert_eq!(*format, ImageFormat::Png);
            assert_eq!(filename_base, "opportunity-12345");
            assert_eq!(card.title, "Clean Water");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    assert!(state.view().exporting);
    assert!(!state.view().can_export);
}

#[test]
fn export_is_not_reentrant_and_resets_on_failure() {
    init_logging();
    let (state, _) = update(
        loaded_state(),
        Msg::ExportClicked {
            format: ImageFormat::Jpeg,
        },
    );
    let (state, effects) = update(
        state,
        Msg::ExportClicked {
            format: ImageFormat::Png,
        },
    );
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::ExportFinished {
            result: ExportResultKind::Failed {
                message: "cover photo unavailable".to_string(),
            },
        },
    );
    let view = state.view();
    assert!(!view.exporting);
    assert!(view.can_export);
    assert_eq!(
        view.export_notice,
        Some(ExportNotice::Failed {
            message: "cover photo unavailable".to_string()
        })
    );
}

#[test]
fn export_without_card_is_ignored() {
    init_logging();
    let (state, effects) = update(
        AppState::new(ViewKind::Opportunity),
        Msg::ExportClicked {
            format: ImageFormat::Png,
        },
    );
    assert!(effects.is_empty());
    assert!(!state.view().exporting);
}
