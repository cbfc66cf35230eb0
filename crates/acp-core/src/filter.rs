//! Filtering, sorting and limiting of session lists

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::age::{cutoff, parse_age};
use crate::labels::{matches_selector, parse_selector, Labels};
use crate::types::{Session, SessionStatus};
use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest `createdAt` first
    Created,
    /// Newest `stoppedAt` first
    Stopped,
    /// Identifier, ascending
    Name,
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "stopped" => Ok(Self::Stopped),
            "name" => Ok(Self::Name),
            other => Err(ValidationError::unsupported(
                "sort_by",
                other,
                &["created", "stopped", "name"],
            )),
        }
    }
}

/// Filter options as supplied by a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub older_than: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl FilterOptions {
    pub fn parse(&self) -> Result<SessionFilter, ValidationError> {
        let status = self.status.as_deref().map(str::parse).transpose()?;
        let older_than = self.older_than.as_deref().map(parse_age).transpose()?;
        let labels = parse_selector(self.label_selector.as_deref())?;
        let sort_by = self.sort_by.as_deref().map(str::parse).transpose()?;
        let limit = match self.limit {
            Some(limit) if limit < 1 => {
                return Err(ValidationError::BelowMinimum {
                    field: "limit".to_string(),
                    min: 1,
                    actual: limit,
                })
            }
            Some(limit) => Some(usize::try_from(limit).unwrap_or(usize::MAX)),
            None => None,
        };

        Ok(SessionFilter {
            status,
            older_than,
            labels,
            sort_by,
            limit,
        })
    }
}

/// A validated filter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub older_than: Option<Duration>,
    pub labels: Option<Labels>,
    pub sort_by: Option<SortKey>,
    pub limit: Option<usize>,
}

type Predicate<'a> = Box<dyn Fn(&Session) -> bool + 'a>;

impl SessionFilter {
    fn predicates(&self, now: DateTime<Utc>) -> Vec<Predicate<'_>> {
        let mut predicates: Vec<Predicate<'_>> = Vec::new();

        if let Some(status) = self.status {
            predicates.push(Box::new(move |s| s.status == status));
        }

        if let Some(age) = self.older_than {
            // An age too large to subtract from `now` cannot be satisfied.
            let limit = cutoff(now, age);
            predicates.push(Box::new(move |s| match (s.created_at, limit) {
                (Some(created), Some(limit)) => created < limit,
                _ => false,
            }));
        }

        if let Some(selector) = &self.labels {
            predicates.push(Box::new(move |s| matches_selector(s, selector)));
        }

        predicates
    }

    /// Keep sessions satisfying every supplied option, then sort and truncate.
    pub fn apply(&self, sessions: Vec<Session>, now: DateTime<Utc>) -> Vec<Session> {
        let predicates = self.predicates(now);
        let mut kept: Vec<Session> = sessions
            .into_iter()
            .filter(|s| predicates.iter().all(|p| p(s)))
            .collect();

        if let Some(key) = self.sort_by {
            sort_sessions(&mut kept, key);
        }

        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }

        kept
    }
}

pub fn sort_sessions(sessions: &mut [Session], key: SortKey) {
    match key {
        SortKey::Created => sessions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortKey::Stopped => sessions.sort_by(|a, b| {
            b.stopped_at
                .cmp(&a.stopped_at)
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortKey::Name => sessions.sort_by(|a, b| a.id.cmp(&b.id)),
    }
}
