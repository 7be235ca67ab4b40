//! Business records extracted from map listings.

use serde::{Deserialize, Serialize};

/// One business extracted from a listing's detail view.
///
/// Text fields are empty strings when no extraction strategy produced a
/// value. Numeric fields are `None` when their parser found nothing usable.
/// `latitude` and `longitude` come from a single location string and are
/// either both set or both `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub address: String,
    pub website: String,
    pub phone_number: String,
    pub reviews_count: Option<u64>,
    pub reviews_average: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Surface location at the moment the record was extracted.
    pub raw_url: String,
    /// Search query that produced this record.
    pub query: String,
}

impl Business {
    /// Creates an empty record stamped with its provenance.
    #[must_use]
    pub fn new(query: &str, raw_url: &str) -> Self {
        Self {
            query: query.to_owned(),
            raw_url: raw_url.to_owned(),
            ..Self::default()
        }
    }

    /// Sets both coordinates from one parsed pair, or clears both.
    pub fn set_coordinates(&mut self, coordinates: Option<(f64, f64)>) {
        match coordinates {
            Some((lat, lon)) => {
                self.latitude = Some(lat);
                self.longitude = Some(lon);
            }
            None => {
                self.latitude = None;
                self.longitude = None;
            }
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Ordered, append-only sequence of records produced by one run.
///
/// Only the scraper appends; once handed to a caller the collection is
/// read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BusinessCollection {
    businesses: Vec<Business>,
}

impl BusinessCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. Reserved for the component driving a run.
    #[doc(hidden)]
    pub fn push(&mut self, business: Business) {
        self.businesses.push(business);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Business> {
        self.businesses.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Business] {
        &self.businesses
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Business> {
        self.businesses
    }
}

impl<'a> IntoIterator for &'a BusinessCollection {
    type Item = &'a Business;
    type IntoIter = std::slice::Iter<'a, Business>;

    fn into_iter(self) -> Self::IntoIter {
        self.businesses.iter()
    }
}
