use crate::{DisplayModel, QueryRequest, RequestSeq};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunQuery { seq: RequestSeq, request: QueryRequest },
    CopyToClipboard { text: String },
    ExportSnapshot { job: ExportJob },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// One snapshot request: the card to draw and the file name it saves under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub card: DisplayModel,
    pub format: ImageFormat,
    /// File name without extension, e.g. `opportunity-12345`.
    pub filename_base: String,
}
