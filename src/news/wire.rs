use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct EverythingEnvelope {
    pub(crate) status: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) articles: Option<Vec<RawArticle>>,
}

#[derive(Deserialize)]
pub(crate) struct RawArticle {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub(crate) published_at: Option<String>,
    pub(crate) url: Option<String>,
}
