//! Filter composition for the service request list.
//!
//! A [`ServiceRequestFilter`] is built once from the raw query parameters and rendered
//! as SQL conditions. Test builds also evaluate it in-process (`matches`, `compare`),
//! and the database tests check both paths select the same rows in the same order.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
#[cfg(test)]
use std::cmp::Ordering;
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::features::service_requests::models::ServiceRequest;
use crate::features::service_requests::models::ServiceRequestStatus;
use crate::shared::query::contains_pattern;

/// Placeholder values the dashboard sends when a dropdown is left untouched
const STATUS_SENTINEL: &str = "Status";
const CATEGORY_SENTINEL: &str = "Category";
const DURATION_SENTINEL: &str = "Duration";

/// Treat empty strings and dropdown placeholders as "no filter"
fn active_value<'a>(raw: Option<&'a str>, sentinel: &str) -> Option<&'a str> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(sentinel))
}

/// Recency windows offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyWindow {
    Last7Days,
    Last30Days,
    Last90Days,
}

impl RecencyWindow {
    pub fn days(&self) -> i64 {
        match self {
            RecencyWindow::Last7Days => 7,
            RecencyWindow::Last30Days => 30,
            RecencyWindow::Last90Days => 90,
        }
    }

    fn from_days(days: i64) -> Option<Self> {
        match days {
            7 => Some(RecencyWindow::Last7Days),
            30 => Some(RecencyWindow::Last30Days),
            90 => Some(RecencyWindow::Last90Days),
            _ => None,
        }
    }

    /// Accepts "Last 7 days", "7", "7d" and "7 days" (any case)
    pub fn parse(raw: &str) -> Result<Self> {
        let lowered = raw.trim().to_lowercase();
        let digits = lowered
            .strip_prefix("last")
            .unwrap_or(&lowered)
            .trim()
            .trim_end_matches("days")
            .trim_end_matches("day")
            .trim_end_matches('d')
            .trim();

        digits
            .parse::<i64>()
            .ok()
            .and_then(Self::from_days)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid duration '{}'. Expected one of: Last 7 days, Last 30 days, Last 90 days",
                    raw
                ))
            })
    }

    /// Earliest creation time still inside the window
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Resolved constraint on the status column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusConstraint {
    Any,
    /// Row status must be one of these (never empty)
    OneOf(Vec<ServiceRequestStatus>),
    /// Contradictory filters; nothing can match
    Nothing,
}

impl StatusConstraint {
    /// Combine an explicit status with the "open only" toggle
    pub fn resolve(status: Option<ServiceRequestStatus>, open_only: bool) -> Self {
        match (status, open_only) {
            (None, false) => StatusConstraint::Any,
            (None, true) => StatusConstraint::OneOf(ServiceRequestStatus::OPEN_SET.to_vec()),
            (Some(status), false) => StatusConstraint::OneOf(vec![status]),
            (Some(status), true) if status.is_open() => StatusConstraint::OneOf(vec![status]),
            (Some(_), true) => StatusConstraint::Nothing,
        }
    }

    #[cfg(test)]
    pub fn allows(&self, status: ServiceRequestStatus) -> bool {
        match self {
            StatusConstraint::Any => true,
            StatusConstraint::OneOf(statuses) => statuses.contains(&status),
            StatusConstraint::Nothing => false,
        }
    }
}

/// Conjunction of every active list filter
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequestFilter {
    pub status: StatusConstraint,
    /// Case-insensitive substring of `service_type`
    pub category: Option<String>,
    /// Lower bound on `created_at`
    pub created_since: Option<DateTime<Utc>>,
}

impl ServiceRequestFilter {
    /// Build a filter from raw dashboard inputs. `now` anchors the recency window.
    pub fn from_inputs(
        status: Option<&str>,
        category: Option<&str>,
        duration: Option<&str>,
        open_only: bool,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let status = active_value(status, STATUS_SENTINEL)
            .map(|raw| {
                raw.parse::<ServiceRequestStatus>()
                    .map_err(AppError::Validation)
            })
            .transpose()?;

        let category = active_value(category, CATEGORY_SENTINEL).map(str::to_string);

        let created_since = active_value(duration, DURATION_SENTINEL)
            .map(RecencyWindow::parse)
            .transpose()?
            .map(|window| window.since(now));

        Ok(Self {
            status: StatusConstraint::resolve(status, open_only),
            category,
            created_since,
        })
    }

    /// True when no filter narrows the set
    pub fn is_unconstrained(&self) -> bool {
        self.status == StatusConstraint::Any
            && self.category.is_none()
            && self.created_since.is_none()
    }

    /// Evaluate the filter against a single record
    #[cfg(test)]
    pub fn matches(&self, request: &ServiceRequest) -> bool {
        if !self.status.allows(request.status) {
            return false;
        }

        if let Some(category) = &self.category {
            if !request
                .service_type
                .to_lowercase()
                .contains(&category.to_lowercase())
            {
                return false;
            }
        }

        if let Some(since) = self.created_since {
            if request.created_at < since {
                return false;
            }
        }

        true
    }

    /// Append ` WHERE ...` for the active filters (nothing when unconstrained)
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if self.is_unconstrained() {
            return;
        }

        builder.push(" WHERE ");
        let mut first = true;
        let mut and = |builder: &mut QueryBuilder<'_, Postgres>| {
            if !first {
                builder.push(" AND ");
            }
            first = false;
        };

        match &self.status {
            StatusConstraint::Any => {}
            StatusConstraint::Nothing => {
                and(builder);
                builder.push("FALSE");
            }
            StatusConstraint::OneOf(statuses) => {
                and(builder);
                builder.push("status IN (");
                let mut separated = builder.separated(", ");
                for status in statuses {
                    separated.push_bind(*status);
                }
                separated.push_unseparated(")");
            }
        }

        if let Some(category) = &self.category {
            and(builder);
            builder
                .push("service_type ILIKE ")
                .push_bind(contains_pattern(category))
                .push(" ESCAPE '\\'");
        }

        if let Some(since) = self.created_since {
            and(builder);
            builder.push("created_at >= ").push_bind(since);
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort fields for the service request list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ServiceRequestSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Status,
    ServiceType,
}

impl ServiceRequestSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ServiceRequestSortBy::CreatedAt => "created_at",
            ServiceRequestSortBy::UpdatedAt => "updated_at",
            ServiceRequestSortBy::Status => "status",
            // Byte order, independent of the database collation
            ServiceRequestSortBy::ServiceType => "service_type COLLATE \"C\"",
        }
    }
}

/// Total order for the list: the sort key, then `id` in the same direction.
///
/// The `id` tiebreak keeps page boundaries stable when many rows share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceRequestOrder {
    pub sort_by: ServiceRequestSortBy,
    pub direction: SortDirection,
}

impl ServiceRequestOrder {
    pub fn push_order_by(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let dir = self.direction.as_sql();
        builder.push(format!(
            " ORDER BY {} {}, id {}",
            self.sort_by.as_sql(),
            dir,
            dir
        ));
    }

    /// In-process equivalent of the ORDER BY clause. Text keys compare bytewise,
    /// which is what `COLLATE "C"` does in Postgres.
    #[cfg(test)]
    pub fn compare(&self, a: &ServiceRequest, b: &ServiceRequest) -> Ordering {
        let key = match self.sort_by {
            ServiceRequestSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            ServiceRequestSortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            ServiceRequestSortBy::Status => a.status.cmp(&b.status),
            ServiceRequestSortBy::ServiceType => a.service_type.cmp(&b.service_type),
        }
        .then_with(|| a.id.cmp(&b.id));

        match self.direction {
            SortDirection::Asc => key,
            SortDirection::Desc => key.reverse(),
        }
    }
}
