//! Site-specific extraction of films and fans
//!
//! Selector strings come from [`SelectorConfig`]; the defaults match the
//! letterboxd.com markup.

use crate::config::SelectorConfig;
use crate::model::{Associate, Entity};
use crate::session::{Document, FetchError};

/// Extracts every film on a catalog listing page, in page order
///
/// Items without a name or a link are skipped.
pub fn extract_entities(
    document: &Document,
    selectors: &SelectorConfig,
) -> Result<Vec<Entity>, FetchError> {
    let mut entities = Vec::new();

    for item in document.query_all(&selectors.catalog_item)? {
        let name = item
            .query_first(&selectors.catalog_name)?
            .and_then(|el| el.attr(&selectors.catalog_name_attr).map(str::to_string));

        let link = item
            .query_first(&selectors.catalog_link)?
            .and_then(|el| el.attr("href").and_then(|href| document.resolve(href)));

        let (name, link) = match (name, link) {
            (Some(name), Some(link)) => (name, link),
            (name, _) => {
                tracing::debug!(
                    "Skipping listing item without name or link on {}: {:?}",
                    document.url(),
                    name
                );
                continue;
            }
        };

        let rating = item
            .attr(&selectors.catalog_rating_attr)
            .filter(|rating| !rating.is_empty())
            .map(str::to_string);

        let poster_url = item
            .query_first(&selectors.catalog_poster)?
            .and_then(|img| img.attr("src").and_then(|src| document.resolve(src)));

        entities.push(
            Entity::new(name, link, &selectors.slug_marker)
                .with_rating(rating)
                .with_poster(poster_url),
        );
    }

    Ok(entities)
}

/// Extracts the fans listed on one fan page of the film `entity_slug`
pub fn extract_fans(
    document: &Document,
    selectors: &SelectorConfig,
    entity_slug: &str,
) -> Result<Vec<Associate>, FetchError> {
    let mut fans = Vec::new();

    for item in document.query_all(&selectors.fan_item)? {
        let fan = item
            .query_first(&selectors.fan_avatar)?
            .and_then(|avatar| {
                avatar
                    .attr("href")
                    .and_then(|href| Associate::from_profile_href(href, entity_slug))
            });

        if let Some(fan) = fan {
            fans.push(fan);
        }
    }

    Ok(fans)
}
