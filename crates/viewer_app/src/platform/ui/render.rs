use viewer_core::{AppViewModel, DisplayModel, ExportNotice, StatusView, ViewKind};

/// Lines to print for the transition from `previous` to `view`. Only the
/// sections that changed are rendered, so the card is not repeated when
/// just the export state moves.
pub fn render_changes(previous: Option<&AppViewModel>, view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let query_changed = previous.map_or(true, |prev| {
        prev.status != view.status || prev.card != view.card
    });
    if query_changed {
        lines.extend(render_status(view));
    }

    let export_changed = previous.map_or(true, |prev| {
        prev.exporting != view.exporting || prev.export_notice != view.export_notice
    });
    if export_changed {
        lines.extend(render_export(view));
    }

    lines
}

fn render_status(view: &AppViewModel) -> Vec<String> {
    match &view.status {
        StatusView::Idle => Vec::new(),
        StatusView::Loading => vec![match view.kind {
            ViewKind::Opportunity => "Fetching opportunity details...".to_string(),
            ViewKind::Post => "Generating your post...".to_string(),
        }],
        StatusView::Error { message } => vec![format!("Error: {message}")],
        StatusView::Ready => view
            .card
            .as_ref()
            .map(|card| render_card(view.kind, card))
            .unwrap_or_default(),
    }
}

fn render_card(kind: ViewKind, card: &DisplayModel) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", card.title)];
    if kind == ViewKind::Opportunity {
        lines.push(format!("Location: {}", card.location));
        lines.push(format!("Company: {}", card.company_name));
        lines.push(format!("Host LC: {}", card.host_name));
        lines.push(format!("Home MC: {}", card.home_name));
        lines.push(format!("SDG Targets: {}", card.sdg_targets));
    }
    if let Some(url) = &card.image_url {
        lines.push(format!("Cover: {url}"));
    }
    lines.push(String::new());
    if kind == ViewKind::Opportunity {
        lines.push("Project Description".to_string());
    }
    lines.extend(card.description.trim().lines().map(ToOwned::to_owned));
    lines
}

fn render_export(view: &AppViewModel) -> Vec<String> {
    if view.exporting {
        return vec!["Generating image...".to_string()];
    }
    match &view.export_notice {
        Some(ExportNotice::Saved { path }) => vec![format!("Saved image to {path}")],
        Some(ExportNotice::Failed { message }) => vec![format!("Image export failed: {message}")],
        None => Vec::new(),
    }
}
