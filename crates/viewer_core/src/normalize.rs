use crate::raw::{NamedRef, OneOrMany, RawOpportunity, RawPayload, RawPost, SdgTarget};

/// Flattened, display-ready record shared by the card, the clipboard text and
/// the snapshot export. Missing values are empty strings; a missing cover
/// photo is `None` so no image section is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayModel {
    pub title: String,
    pub description: String,
    pub location: String,
    pub company_name: String,
    pub host_name: String,
    pub home_name: String,
    pub sdg_targets: String,
    pub image_url: Option<String>,
}

pub fn normalize(payload: &RawPayload) -> DisplayModel {
    match payload {
        RawPayload::Opportunity(raw) => normalize_opportunity(raw),
        RawPayload::Post(raw) => normalize_post(raw),
    }
}

pub fn normalize_opportunity(raw: &RawOpportunity) -> DisplayModel {
    let project = raw.project.as_ref();
    DisplayModel {
        title: text(project.and_then(|p| p.project_name.as_deref())),
        description: text(raw.project_description.as_deref()),
        location: text(raw.location.as_deref()),
        company_name: name_of(
            raw.branch
                .as_ref()
                .and_then(|branch| branch.company.as_ref()),
        ),
        host_name: name_of(raw.host_lc.as_ref()),
        home_name: name_of(raw.home_mc.as_ref()),
        sdg_targets: join_sdg_targets(
            project
                .and_then(|p| p.sdg_info.as_ref())
                .and_then(|info| info.sdg_target.as_ref()),
        ),
        image_url: non_empty(
            raw.cover_photo
                .as_ref()
                .and_then(|cover| cover.url()),
        ),
    }
}

pub fn normalize_post(raw: &RawPost) -> DisplayModel {
    DisplayModel {
        title: text(raw.title.as_deref()),
        description: text(raw.content.as_deref()),
        image_url: non_empty(raw.image.as_deref()),
        ..DisplayModel::default()
    }
}

/// Join SDG target ids with ", " in input order. Absent yields "".
/// Targets without an id are skipped.
pub fn join_sdg_targets(targets: Option<&OneOrMany<SdgTarget>>) -> String {
    let Some(targets) = targets else {
        return String::new();
    };
    targets
        .as_slice()
        .iter()
        .filter_map(|target| target.target_id.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn name_of(named: Option<&NamedRef>) -> String {
    text(named.and_then(|n| n.name.as_deref()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
