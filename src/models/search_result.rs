/// One row of a search or scoped lookup, copied from the provider record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub display_name: String,
    pub artist_name: String,
    pub external_link: String,
    pub thumbnail_url: String,
    pub artist_id: String,
}

impl SearchResult {
    pub fn title_line(&self) -> String {
        format!("{} by {}", self.display_name, self.artist_name)
    }
}
