use std::io::Write;
use std::time::Duration;

use viewer_core::{
    DisplayModel, Effect, ExportResultKind, ImageFormat, Msg, QueryErrorKind, QueryRequest,
    ViewKind,
};
use viewer_engine::{
    CardContent, CardField, EngineEvent, EngineHandle, FailureKind, GraphQlRequest, RasterFormat,
};
use viewer_logging::{viewer_debug, viewer_warn};

/// Stand-in for the system clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str);
}

impl<C: Clipboard + ?Sized> Clipboard for &mut C {
    fn write_text(&mut self, text: &str) {
        (**self).write_text(text);
    }
}

/// Writes copied text to stdout.
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
    }
}

/// Executes core effects against the engine and turns engine events back
/// into messages.
pub struct EffectRunner<'a, C: Clipboard> {
    engine: &'a EngineHandle,
    clipboard: C,
    kind: ViewKind,
}

impl<'a, C: Clipboard> EffectRunner<'a, C> {
    pub fn new(engine: &'a EngineHandle, clipboard: C, kind: ViewKind) -> Self {
        Self {
            engine,
            clipboard,
            kind,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunQuery { seq, request } => {
                    viewer_debug!("Dispatching query seq={} to engine", seq);
                    self.engine.query(seq, map_request(&request));
                }
                Effect::CopyToClipboard { text } => {
                    self.clipboard.write_text(&text);
                }
                Effect::ExportSnapshot { job } => {
                    self.engine.export(
                        card_content(self.kind, &job.card),
                        map_format(job.format),
                        job.filename_base,
                    );
                }
            }
        }
    }

    /// Wait up to `timeout` for the next engine event and convert it.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::QueryCompleted { seq, result } => match result {
            Ok(data) => Msg::QuerySucceeded { seq, data },
            Err(err) => Msg::QueryFailed {
                seq,
                kind: map_failure(err.kind),
                message: err.message,
            },
        },
        EngineEvent::ExportCompleted { result } => Msg::ExportFinished {
            result: match result {
                Ok(path) => ExportResultKind::Saved {
                    path: path.display().to_string(),
                },
                Err(message) => {
                    viewer_warn!("Export failed: {}", message);
                    ExportResultKind::Failed { message }
                }
            },
        },
    }
}

fn map_request(request: &QueryRequest) -> GraphQlRequest {
    match request {
        QueryRequest::Opportunity { id } => GraphQlRequest::opportunity(id),
        QueryRequest::Post { topic } => GraphQlRequest::post(topic),
    }
}

fn map_format(format: ImageFormat) -> RasterFormat {
    match format {
        ImageFormat::Png => RasterFormat::Png,
        ImageFormat::Jpeg => RasterFormat::Jpeg,
    }
}

fn map_failure(kind: FailureKind) -> QueryErrorKind {
    match kind {
        FailureKind::InvalidRequest => QueryErrorKind::InvalidRequest,
        FailureKind::Network => QueryErrorKind::Network,
        FailureKind::Timeout => QueryErrorKind::Timeout,
        FailureKind::HttpStatus(code) => QueryErrorKind::HttpStatus(code),
        FailureKind::GraphQl => QueryErrorKind::GraphQl,
        FailureKind::MalformedResponse => QueryErrorKind::MalformedResponse,
    }
}

/// Lay a display model out as the card each screen shows.
pub fn card_content(kind: ViewKind, card: &DisplayModel) -> CardContent {
    match kind {
        ViewKind::Opportunity => CardContent {
            title: card.title.clone(),
            subtitle: card.location.clone(),
            fields: vec![
                CardField::new("Company", &card.company_name),
                CardField::new("Host LC", &card.host_name),
                CardField::new("Home MC", &card.home_name),
                CardField::new("SDG Targets", &card.sdg_targets),
            ],
            body_heading: Some("Project Description".to_string()),
            body: card.description.clone(),
            cover_url: card.image_url.clone(),
        },
        ViewKind::Post => CardContent {
            title: card.title.clone(),
            body: card.description.clone(),
            cover_url: card.image_url.clone(),
            ..CardContent::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use viewer_engine::QueryError;

    use super::*;

    #[test]
    fn query_failure_maps_kind_and_message() {
        let msg = map_event(EngineEvent::QueryCompleted {
            seq: 3,
            result: Err(QueryError {
                kind: FailureKind::HttpStatus(502),
                message: "502 Bad Gateway".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::QueryFailed {
                seq: 3,
                kind: QueryErrorKind::HttpStatus(502),
                message: "502 Bad Gateway".to_string(),
            }
        );
    }

    #[test]
    fn export_result_maps_to_path_string() {
        let msg = map_event(EngineEvent::ExportCompleted {
            result: Ok(PathBuf::from("downloads").join("opportunity-1.png")),
        });
        match msg {
            Msg::ExportFinished {
                result: ExportResultKind::Saved { path },
            } => assert!(path.ends_with("opportunity-1.png")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn opportunity_card_lists_fields_shown_on_screen() {
        let content = card_content(
            ViewKind::Opportunity,
            &DisplayModel {
                title: "T".to_string(),
                location: "L".to_string(),
                company_name: "C".to_string(),
                sdg_targets: "4.1".to_string(),
                image_url: Some("https://cdn.example.com/c.jpg".to_string()),
                ..DisplayModel::default()
            },
        );
        let labels: Vec<_> = content.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Company", "Host LC", "Home MC", "SDG Targets"]);
        assert_eq!(content.subtitle, "L");
        assert_eq!(content.cover_url.as_deref(), Some("https://cdn.example.com/c.jpg"));
    }

    #[test]
    fn post_card_is_title_and_body_only() {
        let content = card_content(
            ViewKind::Post,
            &DisplayModel {
                title: "T".to_string(),
                description: "B".to_string(),
                ..DisplayModel::default()
            },
        );
        assert!(content.fields.is_empty());
        assert_eq!(content.body_heading, None);
        assert_eq!(content.body, "B");
    }
}
