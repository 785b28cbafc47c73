//! Exhibition Aggregate

use std::collections::HashSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::domain::aggregates::Actor;
use crate::domain::events::{DomainEvent, ExhibitionEvent};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    pub id: String,
    pub consultant_id: String,
    pub consultant_name: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ExhibitionStatus,
    /// Showcased product ids. Not checked against the catalog.
    pub products: Vec<String>,
    pub visitors: u64,
    pub interested: Vec<Interest>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhibitionStatus { #[default] Upcoming, Ongoing, Completed }

impl ExhibitionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self { Self::Upcoming => "upcoming", Self::Ongoing => "ongoing", Self::Completed => "completed" }
    }
}

impl std::str::FromStr for ExhibitionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid exhibition status: {s}")),
        }
    }
}

/// A visitor's registration: whatever they submitted, plus when.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct ExhibitionDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ExhibitionStatus,
    pub products: Vec<String>,
}

impl Exhibition {
    pub fn create(id: impl Into<String>, consultant: &Actor, draft: ExhibitionDraft) -> Result<Self, ExhibitionError> {
        let name = draft.name.trim();
        let location = draft.location.trim();
        let description = draft.description.trim();
        if name.is_empty() { return Err(ExhibitionError::MissingName); }
        if location.is_empty() { return Err(ExhibitionError::MissingLocation); }
        if description.is_empty() { return Err(ExhibitionError::MissingDescription); }
        if draft.end_date < draft.start_date { return Err(ExhibitionError::EndsBeforeStart); }
        let mut seen = HashSet::new();
        let mut products = draft.products;
        products.retain(|p| seen.insert(p.clone()));
        let mut exhibition = Self {
            id: id.into(), consultant_id: consultant.id.clone(), consultant_name: consultant.name.clone(),
            name: name.to_string(), description: description.to_string(), location: location.to_string(),
            start_date: draft.start_date, end_date: draft.end_date, status: draft.status, products,
            visitors: 0, interested: vec![], created_at: Utc::now(), events: vec![],
        };
        exhibition.raise_event(DomainEvent::Exhibition(ExhibitionEvent::Created {
            exhibition_id: exhibition.id.clone(), consultant_id: exhibition.consultant_id.clone(),
        }));
        Ok(exhibition)
    }

    /// Rebuild an exhibition from storage without raising events.
    pub fn restore(
        id: String, consultant_id: String, consultant_name: String, draft: ExhibitionDraft,
        visitors: u64, interested: Vec<Interest>, created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id, consultant_id, consultant_name, name: draft.name, description: draft.description,
            location: draft.location, start_date: draft.start_date, end_date: draft.end_date,
            status: draft.status, products: draft.products, visitors, interested, created_at, events: vec![],
        }
    }

    /// Counts a visitor and records their payload. Returns the new visitor count.
    ///
    /// Raises no event: the store applies this under its own lock, so the
    /// caller announces the count it gets back.
    pub fn register_interest(&mut self, interest: Interest) -> u64 {
        self.visitors += 1;
        self.interested.push(interest);
        self.visitors
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExhibitionError { MissingName, MissingLocation, MissingDescription, EndsBeforeStart }
impl std::error::Error for ExhibitionError {}
impl std::fmt::Display for ExhibitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "exhibition name is required"),
            Self::MissingLocation => write!(f, "location is required"),
            Self::MissingDescription => write!(f, "description is required"),
            Self::EndsBeforeStart => write!(f, "end date is before start date"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::aggregates::Role;

    pub(crate) fn draft() -> ExhibitionDraft {
        ExhibitionDraft {
            name: "Tribal Crafts Mela".into(), description: "Crafts from Bastar".into(), location: "Delhi Haat".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(), end_date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap(),
            status: ExhibitionStatus::Upcoming, products: vec!["p1".into(), "p9".into(), "p1".into()],
        }
    }
    fn consultant() -> Actor { Actor { id: "k1".into(), name: "Amit Verma".into(), role: Role::Consultant } }

    #[test]
    fn test_create_exhibition() {
        let ex = Exhibition::create("e1", &consultant(), draft()).unwrap();
        assert_eq!(ex.visitors, 0);
        assert_eq!(ex.products, vec!["p1".to_string(), "p9".to_string()]);
        assert_eq!(ex.consultant_name, "Amit Verma");
    }
    #[test]
    fn test_end_before_start_rejected() {
        let bad = ExhibitionDraft { end_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(), ..draft() };
        assert_eq!(Exhibition::create("e1", &consultant(), bad).unwrap_err(), ExhibitionError::EndsBeforeStart);
    }
    #[test]
    fn test_register_interest() {
        let mut ex = Exhibition::create("e1", &consultant(), draft()).unwrap();
        let mut payload = Map::new();
        payload.insert("name".into(), Value::String("Visitor".into()));
        assert_eq!(ex.register_interest(Interest { payload, timestamp: Utc::now() }), 1);
        assert_eq!(ex.register_interest(Interest { payload: Map::new(), timestamp: Utc::now() }), 2);
        assert_eq!(ex.take_events().len(), 1, "only the creation event");
        let json = serde_json::to_value(&ex.interested[0]).unwrap();
        assert_eq!(json["name"], "Visitor");
        assert!(json.get("timestamp").is_some());
    }
}
