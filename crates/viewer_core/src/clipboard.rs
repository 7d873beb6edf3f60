use crate::{DisplayModel, ViewKind};

/// Plain-text rendering of a card for the clipboard.
pub fn copy_text(kind: ViewKind, card: &DisplayModel) -> String {
    let text = match kind {
        ViewKind::Opportunity => format!(
            "Project: {}\nLocation: {}\nCompany: {}\nHost LC: {}\nHome MC: {}\n\n{}",
            card.title,
            card.location,
            card.company_name,
            card.host_name,
            card.home_name,
            card.description
        ),
        ViewKind::Post => format!("{}\n\n{}", card.title, card.description),
    };
    text.trim().to_string()
}
