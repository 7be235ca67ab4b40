//! `XPath` selectors for the Google Maps search interface.

pub const SEARCH_INPUT: &str = r#"//input[@id="searchboxinput"]"#;

/// Result anchors in the left-hand results feed, one per listing.
pub const LISTING_ANCHOR: &str = r#"//a[contains(@href, "https://www.google.com/maps/place")]"#;

/// Relative selector for an element's direct container.
pub const PARENT: &str = "..";

pub const NAME_TITLE: &[&str] = &[
    r#"//h1[contains(@class, "fontHeadlineLarge")]"#,
    r#"//h1[@data-testid="title"]"#,
    "//h1",
];

pub const ADDRESS: &[&str] = &[
    r#"//button[@data-item-id="address"]//div[contains(@class, "fontBodyMedium")]"#,
    r#"//button[contains(@data-item-id, "address")]"#,
    r#"//div[@data-item-id="address"]"#,
];

pub const WEBSITE: &[&str] = &[
    r#"//a[@data-item-id="authority"]//div[contains(@class, "fontBodyMedium")]"#,
    r#"//a[contains(@href, "http") and contains(@data-item-id, "authority")]"#,
    r#"//a[contains(@href, "http") and contains(@class, "website")]"#,
];

pub const PHONE: &[&str] = &[
    r#"//button[contains(@data-item-id, "phone:tel:")]//div[contains(@class, "fontBodyMedium")]"#,
    r#"//button[contains(@aria-label, "Позвонить")]"#,
    r#"//a[contains(@href, "tel:")]"#,
];

pub const RATING: &[&str] = &[
    r#"//span[contains(@aria-label, "звезд")]"#,
    r#"//div[@role="img" and contains(@aria-label, "звезд")]"#,
    r#"//span[contains(@class, "section-star-display")]"#,
    r#"//div[contains(@aria-label, "out of 5")]"#,
];

pub const REVIEWS: &[&str] = &[
    r#"//button[@jsaction="pane.reviewChart.moreReviews"]//span"#,
    r#"//button[contains(@aria-label, "отзыв")]"#,
    r#"//span[contains(text(), "отзыв")]"#,
    r#"//span[contains(text(), "reviews")]"#,
];

/// Handle attribute holding the listing's display name.
pub const NAME_ATTRIBUTE: &str = "aria-label";

/// Handle attribute holding the listing's detail-page link.
pub const LINK_ATTRIBUTE: &str = "href";
