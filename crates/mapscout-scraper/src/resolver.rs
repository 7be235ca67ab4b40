//! Opens one listing and extracts a [`Business`] from its detail view.
//!
//! Each field has an ordered list of strategies; the first one that yields
//! non-empty text wins. A field no strategy can fill stays an empty string.

use std::time::Duration;

use mapscout_core::Business;

use crate::error::{recoverable, ScrapeError};
use crate::parse::{extract_coordinates_from_url, parse_rating, parse_reviews_count};
use crate::selectors;
use crate::surface::AutomationSurface;

/// One way of reading a field's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Read an attribute off the listing handle itself.
    HandleAttribute(String),
    /// Trimmed inner text of the first page element matching an `XPath`.
    Text(String),
}

impl Strategy {
    #[must_use]
    pub fn attribute(name: &str) -> Self {
        Strategy::HandleAttribute(name.to_owned())
    }

    #[must_use]
    pub fn text(selector: &str) -> Self {
        Strategy::Text(selector.to_owned())
    }
}

/// Strategy chains for every extracted field, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub name: Vec<Strategy>,
    pub address: Vec<Strategy>,
    pub website: Vec<Strategy>,
    pub phone_number: Vec<Strategy>,
    pub rating: Vec<Strategy>,
    pub reviews: Vec<Strategy>,
}

fn text_chain(chain: &[&str]) -> Vec<Strategy> {
    chain.iter().map(|s| Strategy::text(s)).collect()
}

impl Default for ExtractionPlan {
    /// Google Maps detail-pane chains.
    fn default() -> Self {
        let mut name = vec![Strategy::attribute(selectors::NAME_ATTRIBUTE)];
        name.extend(text_chain(selectors::NAME_TITLE));
        Self {
            name,
            address: text_chain(selectors::ADDRESS),
            website: text_chain(selectors::WEBSITE),
            phone_number: text_chain(selectors::PHONE),
            rating: text_chain(selectors::RATING),
            reviews: text_chain(selectors::REVIEWS),
        }
    }
}

/// Which open strategy brought the listing into focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTier {
    Click,
    Navigate,
    ContainerClick,
}

/// Opens listings and reads their fields through an [`AutomationSurface`].
pub struct FieldResolver<'a, S>
where
    S: AutomationSurface,
{
    surface: &'a S,
    plan: &'a ExtractionPlan,
    settle: Duration,
}

impl<'a, S> FieldResolver<'a, S>
where
    S: AutomationSurface,
{
    /// `settle` is the pause between opening a listing and reading it.
    pub fn new(surface: &'a S, plan: &'a ExtractionPlan, settle: Duration) -> Self {
        Self {
            surface,
            plan,
            settle,
        }
    }

    /// Brings a listing's detail view into focus.
    ///
    /// Tries, in order: clicking the handle, navigating to its `href`, and
    /// clicking its containing element.
    ///
    /// The `href` tier replaces the results document, so the surface stays on
    /// the listing page afterwards. On surfaces whose element handles belong
    /// to one document (WebDriver), the remaining handles are stale from then
    /// on and each of them ends in [`ScrapeError::OpenFailed`].
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::OpenFailed`] when all three strategies fail.
    /// - [`ScrapeError::SessionFailure`] if the surface becomes unusable.
    pub async fn open(&self, index: usize, handle: &S::Element) -> Result<OpenTier, ScrapeError> {
        let click_err = match self.surface.click(handle).await {
            Ok(()) => return Ok(OpenTier::Click),
            Err(err) => recoverable(err)?,
        };
        tracing::debug!(index, error = %click_err, "click failed; trying href");

        let href_err = match self
            .surface
            .attribute(handle, selectors::LINK_ATTRIBUTE)
            .await
        {
            Ok(Some(href)) if !href.trim().is_empty() => {
                match self.surface.navigate(href.trim()).await {
                    Ok(()) => return Ok(OpenTier::Navigate),
                    Err(err) => recoverable(err)?.to_string(),
                }
            }
            Ok(_) => "listing has no href".to_string(),
            Err(err) => recoverable(err)?.to_string(),
        };
        tracing::debug!(index, error = %href_err, "href navigation failed; trying container");

        let container_err = match self.surface.find_within(handle, selectors::PARENT).await {
            Ok(containers) => match containers.first() {
                Some(container) => match self.surface.click(container).await {
                    Ok(()) => return Ok(OpenTier::ContainerClick),
                    Err(err) => recoverable(err)?.to_string(),
                },
                None => "listing has no container".to_string(),
            },
            Err(err) => recoverable(err)?.to_string(),
        };

        Err(ScrapeError::OpenFailed {
            index,
            reason: format!("click: {click_err}; href: {href_err}; container: {container_err}"),
        })
    }

    /// Runs `strategies` in order and returns the first non-empty text, or
    /// an empty string when none produce anything.
    ///
    /// Per-operation failures count as "empty".
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::SessionFailure`] if the surface becomes unusable.
    pub async fn resolve_field(
        &self,
        handle: &S::Element,
        strategies: &[Strategy],
    ) -> Result<String, ScrapeError> {
        for strategy in strategies {
            let text = match strategy {
                Strategy::HandleAttribute(name) => self.handle_attribute(handle, name).await?,
                Strategy::Text(selector) => self.first_text(selector).await?,
            };
            if !text.is_empty() {
                tracing::debug!(?strategy, "field strategy matched");
                return Ok(text);
            }
        }
        Ok(String::new())
    }

    /// Opens `handle`, waits for the detail view to settle, and extracts a
    /// record stamped with `query`.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::OpenFailed`] when the listing cannot be opened.
    /// - [`ScrapeError::SessionFailure`] if the surface becomes unusable.
    pub async fn resolve(
        &self,
        index: usize,
        handle: &S::Element,
        query: &str,
    ) -> Result<Business, ScrapeError> {
        let tier = self.open(index, handle).await?;
        tracing::debug!(index, ?tier, "listing opened");

        tokio::time::sleep(self.settle).await;

        let raw_url = match self.surface.current_url().await {
            Ok(url) => url,
            Err(err) => {
                let err = recoverable(err)?;
                tracing::warn!(index, error = %err, "could not read current location");
                String::new()
            }
        };

        let mut business = Business::new(query, &raw_url);
        business.name = self.resolve_field(handle, &self.plan.name).await?;
        business.address = self.resolve_field(handle, &self.plan.address).await?;
        business.website = self.resolve_field(handle, &self.plan.website).await?;
        business.phone_number = self.resolve_field(handle, &self.plan.phone_number).await?;

        let rating_text = self.resolve_field(handle, &self.plan.rating).await?;
        business.reviews_average = parse_rating(&rating_text);

        let reviews_text = self.resolve_field(handle, &self.plan.reviews).await?;
        business.reviews_count = parse_reviews_count(&reviews_text);

        business.set_coordinates(extract_coordinates_from_url(&raw_url));

        Ok(business)
    }

    async fn handle_attribute(&self, handle: &S::Element, name: &str) -> Result<String, ScrapeError> {
        match self.surface.attribute(handle, name).await {
            Ok(value) => Ok(value.map(|v| v.trim().to_owned()).unwrap_or_default()),
            Err(err) => {
                recoverable(err)?;
                Ok(String::new())
            }
        }
    }

    async fn first_text(&self, selector: &str) -> Result<String, ScrapeError> {
        let elements = match self.surface.find_all(selector).await {
            Ok(elements) => elements,
            Err(err) => {
                recoverable(err)?;
                return Ok(String::new());
            }
        };
        let Some(first) = elements.first() else {
            return Ok(String::new());
        };
        match self.surface.inner_text(first).await {
            Ok(text) => Ok(text.trim().to_owned()),
            Err(err) => {
                recoverable(err)?;
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
