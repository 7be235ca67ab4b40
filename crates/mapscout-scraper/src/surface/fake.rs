//! Scripted in-memory surface for exercising the engine without a browser.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use super::AutomationSurface;
use crate::error::SurfaceError;
use crate::selectors::{LINK_ATTRIBUTE, LISTING_ANCHOR, NAME_ATTRIBUTE, PARENT, SEARCH_INPUT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeElement {
    Listing(usize),
    Container(usize),
    Node(String),
}

/// Shared record of every call made against a [`FakeSurface`].
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    /// Number of entries named `name` (with or without a `:detail` suffix).
    pub(crate) fn count(&self, name: &str) -> usize {
        let prefix = format!("{name}:");
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == name || e.starts_with(&prefix))
            .count()
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct FakeState {
    counts: VecDeque<usize>,
    current_count: usize,
    texts: HashMap<String, String>,
    names: HashMap<usize, String>,
    urls: HashMap<usize, String>,
    unclickable: HashSet<usize>,
    no_href: HashSet<usize>,
    orphaned: HashSet<usize>,
    session_dies_at: Option<usize>,
    failing_scrolls: usize,
    failing_counts: usize,
    listing_lookup_fails: bool,
    location_fails: bool,
    dead: bool,
    url: String,
}

pub(crate) struct FakeSurface {
    state: Mutex<FakeState>,
    log: CallLog,
}

pub(crate) fn listing_url(index: usize) -> String {
    format!("https://www.google.com/maps/place/Listing+{index}/@51.16,71.47,17z/data=!3m1")
}

impl FakeState {
    fn url_of(&self, index: usize) -> String {
        self.urls
            .get(&index)
            .cloned()
            .unwrap_or_else(|| listing_url(index))
    }
}

impl FakeSurface {
    pub(crate) fn new() -> Self {
        let mut state = FakeState {
            url: "about:blank".to_string(),
            ..FakeState::default()
        };
        state.texts.insert(SEARCH_INPUT.to_string(), String::new());
        Self {
            state: Mutex::new(state),
            log: CallLog::default(),
        }
    }

    pub(crate) fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Successive results of counting listing anchors; the last value repeats.
    pub(crate) fn with_counts(self, counts: impl IntoIterator<Item = usize>) -> Self {
        self.state().counts = counts.into_iter().collect();
        self
    }

    /// Makes `selector` match one element whose inner text is `text`.
    pub(crate) fn with_text(self, selector: &str, text: &str) -> Self {
        self.state()
            .texts
            .insert(selector.to_string(), text.to_string());
        self
    }

    pub(crate) fn with_name(self, index: usize, name: &str) -> Self {
        self.state().names.insert(index, name.to_string());
        self
    }

    /// Location the surface reports once this listing is open.
    pub(crate) fn with_url(self, index: usize, url: &str) -> Self {
        self.state().urls.insert(index, url.to_string());
        self
    }

    pub(crate) fn without_search_input(self) -> Self {
        self.state().texts.remove(SEARCH_INPUT);
        self
    }

    pub(crate) fn unclickable(self, index: usize) -> Self {
        self.state().unclickable.insert(index);
        self
    }

    pub(crate) fn without_href(self, index: usize) -> Self {
        self.state().no_href.insert(index);
        self
    }

    pub(crate) fn orphaned(self, index: usize) -> Self {
        self.state().orphaned.insert(index);
        self
    }

    /// Every open strategy fails for this listing.
    pub(crate) fn unopenable(self, index: usize) -> Self {
        self.unclickable(index).without_href(index).orphaned(index)
    }

    /// Clicking this listing kills the session for good.
    pub(crate) fn session_dies_at(self, index: usize) -> Self {
        self.state().session_dies_at = Some(index);
        self
    }

    /// The next `n` scrolls fail with an operation error.
    pub(crate) fn failing_scrolls(self, n: usize) -> Self {
        self.state().failing_scrolls = n;
        self
    }

    /// The next `n` listing counts fail without consuming scripted counts.
    pub(crate) fn failing_counts(self, n: usize) -> Self {
        self.state().failing_counts = n;
        self
    }

    /// Looking up the listing handles always fails.
    pub(crate) fn failing_listing_lookup(self) -> Self {
        self.state().listing_lookup_fails = true;
        self
    }

    /// Reading the current location always fails.
    pub(crate) fn failing_location(self) -> Self {
        self.state().location_fails = true;
        self
    }

    fn alive(&self) -> Result<MutexGuard<'_, FakeState>, SurfaceError> {
        let state = self.state();
        if state.dead {
            return Err(SurfaceError::Session("invalid session id".to_string()));
        }
        Ok(state)
    }
}

impl AutomationSurface for FakeSurface {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), SurfaceError> {
        let mut state = self.alive()?;
        self.log.record(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SurfaceError> {
        let state = self.alive()?;
        if state.location_fails {
            return Err(SurfaceError::Operation("no such window".to_string()));
        }
        Ok(state.url.clone())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), SurfaceError> {
        let state = self.alive()?;
        if !state.texts.contains_key(selector) {
            return Err(SurfaceError::Operation(format!("no such element: {selector}")));
        }
        self.log.record(format!("fill:{text}"));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), SurfaceError> {
        let _state = self.alive()?;
        self.log.record(format!("press_key:{key}"));
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize, SurfaceError> {
        let mut state = self.alive()?;
        if selector == LISTING_ANCHOR {
            if state.failing_counts > 0 {
                state.failing_counts -= 1;
                return Err(SurfaceError::Operation("stale element reference".to_string()));
            }
            if let Some(next) = state.counts.pop_front() {
                state.current_count = next;
            }
            return Ok(state.current_count);
        }
        Ok(usize::from(state.texts.contains_key(selector)))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, SurfaceError> {
        let state = self.alive()?;
        if selector == LISTING_ANCHOR {
            if state.listing_lookup_fails {
                return Err(SurfaceError::Operation("javascript error".to_string()));
            }
            return Ok((0..state.current_count).map(FakeElement::Listing).collect());
        }
        if state.texts.contains_key(selector) {
            return Ok(vec![FakeElement::Node(selector.to_string())]);
        }
        Ok(Vec::new())
    }

    async fn find_within(
        &self,
        element: &FakeElement,
        selector: &str,
    ) -> Result<Vec<FakeElement>, SurfaceError> {
        let _state = self.alive()?;
        match element {
            FakeElement::Listing(i) if selector == PARENT => Ok(vec![FakeElement::Container(*i)]),
            _ => Ok(Vec::new()),
        }
    }

    async fn inner_text(&self, element: &FakeElement) -> Result<String, SurfaceError> {
        let state = self.alive()?;
        match element {
            FakeElement::Node(selector) => Ok(state.texts.get(selector).cloned().unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, SurfaceError> {
        let state = self.alive()?;
        let FakeElement::Listing(i) = element else {
            return Ok(None);
        };
        match name {
            NAME_ATTRIBUTE => Ok(state.names.get(i).cloned()),
            LINK_ATTRIBUTE if !state.no_href.contains(i) => Ok(Some(state.url_of(*i))),
            _ => Ok(None),
        }
    }

    async fn scroll(&self, delta_x: i64, delta_y: i64) -> Result<(), SurfaceError> {
        let mut state = self.alive()?;
        if state.failing_scrolls > 0 {
            state.failing_scrolls -= 1;
            return Err(SurfaceError::Operation("move target out of bounds".to_string()));
        }
        self.log.record(format!("scroll:{delta_x},{delta_y}"));
        Ok(())
    }

    async fn click(&self, element: &FakeElement) -> Result<(), SurfaceError> {
        let mut state = self.alive()?;
        match element {
            FakeElement::Listing(i) => {
                if state.session_dies_at == Some(*i) {
                    state.dead = true;
                    return Err(SurfaceError::Session("browser disconnected".to_string()));
                }
                if state.unclickable.contains(i) {
                    return Err(SurfaceError::Operation(
                        "element click intercepted".to_string(),
                    ));
                }
                self.log.record(format!("click:{i}"));
                state.url = state.url_of(*i);
            }
            FakeElement::Container(i) => {
                if state.orphaned.contains(i) {
                    return Err(SurfaceError::Operation(
                        "element not interactable".to_string(),
                    ));
                }
                self.log.record(format!("click_container:{i}"));
                state.url = state.url_of(*i);
            }
            FakeElement::Node(_) => {}
        }
        Ok(())
    }

    async fn hover(&self, element: &FakeElement) -> Result<(), SurfaceError> {
        let _state = self.alive()?;
        self.log.record(format!("hover:{element:?}"));
        Ok(())
    }

    async fn close(&self) -> Result<(), SurfaceError> {
        self.log.record("close");
        Ok(())
    }
}
