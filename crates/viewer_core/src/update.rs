use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use crate::state::Card;
use crate::view_model::ExportNotice;
use crate::{
    copy_text, normalize, AppState, Effect, ExportJob, ExportResultKind, Msg, PayloadError,
    QueryErrorKind, QueryRequest, RawPayload,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::Submitted => {
            let identifier = state.input().trim().to_string();
            if identifier.is_empty() {
                return (state, Vec::new());
            }
            // A submit while loading supersedes the in-flight request.
            let seq = state.query_mut().begin();
            state.set_pending_identifier(identifier.clone());
            state.mark_dirty();
            let request = QueryRequest::new(state.kind(), identifier);
            viewer_info!(
                "RunQuery seq={} kind={} identifier={}",
                seq,
                request.kind(),
                request.identifier()
            );
            vec![Effect::RunQuery { seq, request }]
        }
        Msg::QuerySucceeded { seq, data } => {
            if !state.query_mut().accepts(seq) {
                viewer_debug!("Discarding stale response seq={}", seq);
                return (state, Vec::new());
            }
            match RawPayload::decode(state.kind(), data) {
                Ok(payload) => {
                    state.query_mut().succeed(seq);
                    let identifier = state.take_pending_identifier().unwrap_or_default();
                    state.set_card(Some(Card {
                        identifier,
                        model: normalize(&payload),
                    }));
                }
                Err(err) => {
                    let kind = match err {
                        PayloadError::NotFound { .. } => QueryErrorKind::NotFound,
                        PayloadError::Malformed { .. } => QueryErrorKind::MalformedResponse,
                    };
                    let identifier = state.take_pending_identifier().unwrap_or_default();
                    let message = match err {
                        PayloadError::NotFound { kind } => {
                            format!("no {kind} found for '{identifier}'")
                        }
                        other => other.to_string(),
                    };
                    viewer_warn!("Query seq={} rejected: {}", seq, message);
                    state.query_mut().fail(seq, kind, message);
                    state.set_card(None);
                }
            }
            Vec::new()
        }
        Msg::QueryFailed { seq, kind, message } => {
            if !state.query_mut().fail(seq, kind, message) {
                viewer_debug!("Discarding stale failure seq={}", seq);
                return (state, Vec::new());
            }
            state.take_pending_identifier();
            state.set_card(None);
            Vec::new()
        }
        Msg::CopyClicked => match state.card() {
            Some(card) => vec![Effect::CopyToClipboard {
                text: copy_text(state.kind(), &card.model),
            }],
            None => Vec::new(),
        },
        Msg::ExportClicked { format } => {
            if state.is_exporting() {
                return (state, Vec::new());
            }
            let Some(card) = state.card() else {
                return (state, Vec::new());
            };
            let job = ExportJob {
                card: card.model.clone(),
                format,
                filename_base: format!("{}-{}", state.kind().file_prefix(), card.identifier),
            };
            state.set_exporting(true);
            state.set_export_notice(None);
            vec![Effect::ExportSnapshot { job }]
        }
        Msg::ExportFinished { result } => {
            if !state.is_exporting() {
                return (state, Vec::new());
            }
            state.set_exporting(false);
            let notice = match result {
                ExportResultKind::Saved { path } => ExportNotice::Saved { path },
                ExportResultKind::Failed { message } => ExportNotice::Failed { message },
            };
            state.set_export_notice(Some(notice));
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
