//! Film records produced by the catalog crawl

use serde::{Deserialize, Deserializer, Serialize};

/// Slug recorded for films whose link has no recognizable slug segment
pub const NO_SLUG: &str = "No slug";

/// One film from the catalog listing
///
/// Catalog order is meaningful: the fan crawl's start and stop markers select a
/// contiguous window of this sequence by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(alias = "filmName")]
    pub name: String,

    #[serde(alias = "filmLink")]
    pub link: String,

    #[serde(default = "no_slug")]
    pub slug: String,

    #[serde(
        default,
        deserialize_with = "optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<String>,

    #[serde(
        rename = "posterUrl",
        default,
        deserialize_with = "optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_url: Option<String>,
}

impl Entity {
    /// Creates a film record, deriving its slug from `link`
    pub fn new(name: impl Into<String>, link: impl Into<String>, slug_marker: &str) -> Self {
        let link = link.into();
        let slug = slug_from_link(&link, slug_marker);
        Self {
            name: name.into(),
            link,
            slug,
            rating: None,
            poster_url: None,
        }
    }

    pub fn with_rating(mut self, rating: Option<String>) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_poster(mut self, poster_url: Option<String>) -> Self {
        self.poster_url = poster_url;
        self
    }

    pub fn has_slug(&self) -> bool {
        self.slug != NO_SLUG
    }
}

/// Extracts the slug from a film link
///
/// The slug is the text after `marker` up to the next `/`, so
/// `https://letterboxd.com/film/fight-club/` with marker `/film/` yields
/// `fight-club`. A missing marker or an empty segment yields [`NO_SLUG`].
pub fn slug_from_link(link: &str, marker: &str) -> String {
    link.split_once(marker)
        .and_then(|(_, rest)| rest.split('/').next())
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .unwrap_or_else(no_slug)
}

fn no_slug() -> String {
    NO_SLUG.to_string()
}

/// Placeholders older catalog snapshots stored in place of missing values
const LEGACY_PLACEHOLDERS: [&str; 2] = ["No rating", "No image"];

fn optional_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty() && !LEGACY_PLACEHOLDERS.contains(&v.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_link() {
        assert_eq!(
            slug_from_link("https://letterboxd.com/film/fight-club/", "/film/"),
            "fight-club"
        );
        assert_eq!(
            slug_from_link("https://letterboxd.com/film/heat-1995", "/film/"),
            "heat-1995"
        );
        assert_eq!(
            slug_from_link("https://letterboxd.com/film/zodiac/reviews/", "/film/"),
            "zodiac"
        );
    }

    #[test]
    fn test_slug_sentinel() {
        assert_eq!(slug_from_link("https://letterboxd.com/films/", "/film/"), NO_SLUG);
        assert_eq!(slug_from_link("https://letterboxd.com/film/", "/film/"), NO_SLUG);
        assert_eq!(slug_from_link("No link", "/film/"), NO_SLUG);
    }

    #[test]
    fn test_new_derives_slug() {
        let entity = Entity::new("Zodiac", "https://letterboxd.com/film/zodiac/", "/film/");
        assert_eq!(entity.slug, "zodiac");
        assert!(entity.has_slug());
        assert_eq!(entity.rating, None);
    }

    #[test]
    fn test_serialized_field_names() {
        let entity = Entity::new("Heat", "https://letterboxd.com/film/heat-1995/", "/film/")
            .with_rating(Some("4.21".to_string()))
            .with_poster(Some("https://a.ltrbxd.com/heat.jpg".to_string()));
        let json = serde_json::to_value(&entity).unwrap();

        assert_eq!(json["name"], "Heat");
        assert_eq!(json["link"], "https://letterboxd.com/film/heat-1995/");
        assert_eq!(json["slug"], "heat-1995");
        assert_eq!(json["rating"], "4.21");
        assert_eq!(json["posterUrl"], "https://a.ltrbxd.com/heat.jpg");
    }

    #[test]
    fn test_reads_legacy_records() {
        let json = r#"{
            "filmName": "Fight Club",
            "rating": "4.27",
            "posterUrl": "https://a.ltrbxd.com/fight-club.jpg",
            "filmLink": "https://letterboxd.com/film/fight-club/",
            "slug": "fight-club"
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();

        assert_eq!(entity.name, "Fight Club");
        assert_eq!(entity.link, "https://letterboxd.com/film/fight-club/");
        assert_eq!(entity.slug, "fight-club");
        assert_eq!(entity.rating.as_deref(), Some("4.27"));
    }

    #[test]
    fn test_missing_slug_reads_as_sentinel() {
        let json = r#"{"name": "Untitled", "link": "https://letterboxd.com/list/x/"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.slug, NO_SLUG);
        assert!(!entity.has_slug());
    }

    #[test]
    fn test_legacy_placeholders_read_as_missing() {
        let json = r#"{
            "filmName": "Obscure Short",
            "rating": "No rating",
            "posterUrl": "No image",
            "filmLink": "https://letterboxd.com/film/obscure-short/"
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();

        assert_eq!(entity.rating, None);
        assert_eq!(entity.poster_url, None);
        assert_eq!(entity.slug, NO_SLUG);

        let json = serde_json::to_value(&entity).unwrap();
        assert!(json.get("rating").is_none());
    }
}
