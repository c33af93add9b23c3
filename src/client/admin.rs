//! Admin dashboard endpoints.
//!
//! Reads go through the cache. Every mutation invalidates the resource
//! families it changes, listed explicitly in [`Mutation::invalidation_patterns`].

use serde_json::{json, Value};
use tracing::debug;

use crate::client::{ApiClient, Method, RequestOptions, Transport};
use crate::error::Result;

// == Resource Families ==
pub const USERS: &str = "/admin/users";
pub const BOOKINGS: &str = "/admin/bookings";
pub const TOURS: &str = "/admin/tours";
pub const EARNINGS: &str = "/admin/earnings";
pub const WITHDRAWALS: &str = "/admin/withdrawals";
pub const VERIFICATIONS: &str = "/admin/verifications";
pub const ANALYTICS: &str = "/admin/analytics";
pub const DASHBOARD: &str = "/admin/dashboard";

// == Mutation ==
/// Every write the dashboard performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    UpdateUserStatus,
    DeleteUser,
    MarkBookingComplete,
    CancelBooking,
    ReleasePayment,
    ApproveWithdrawal,
    RejectWithdrawal,
    ApproveVerification,
    RejectVerification,
    UpdateTourStatus,
    DeleteTour,
}

impl Mutation {
    /// Cached reads made stale by this mutation.
    ///
    /// Booking and payment changes also move the aggregate figures shown on
    /// the dashboard, analytics and earnings pages.
    pub fn invalidation_patterns(self) -> &'static [&'static str] {
        match self {
            Mutation::UpdateUserStatus => &[USERS, DASHBOARD, ANALYTICS],
            Mutation::DeleteUser => &[USERS, BOOKINGS, TOURS, DASHBOARD, ANALYTICS],
            Mutation::MarkBookingComplete | Mutation::CancelBooking => {
                &[BOOKINGS, ANALYTICS, EARNINGS, DASHBOARD]
            }
            Mutation::ReleasePayment => &[BOOKINGS, EARNINGS, WITHDRAWALS, ANALYTICS, DASHBOARD],
            Mutation::ApproveWithdrawal | Mutation::RejectWithdrawal => {
                &[WITHDRAWALS, EARNINGS, DASHBOARD]
            }
            Mutation::ApproveVerification | Mutation::RejectVerification => {
                &[VERIFICATIONS, USERS, DASHBOARD]
            }
            Mutation::UpdateTourStatus => &[TOURS, DASHBOARD, ANALYTICS],
            Mutation::DeleteTour => &[TOURS, BOOKINGS, DASHBOARD, ANALYTICS],
        }
    }
}

// == List Query ==
/// Pagination and filters shared by the list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Appends the query string to `path`. Parameters always appear in the
    /// same order so equal queries give equal cache keys.
    pub fn to_endpoint(&self, path: &str) -> String {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(format!("page={page}"));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(ref status) = self.status {
            params.push(format!("status={}", urlencoding::encode(status)));
        }
        if let Some(ref search) = self.search {
            params.push(format!("search={}", urlencoding::encode(search)));
        }

        if params.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, params.join("&"))
        }
    }
}

fn resource(family: &str, id: &str) -> String {
    format!("{}/{}", family, urlencoding::encode(id))
}

impl<T: Transport> ApiClient<T> {
    // ===== Reads =====

    pub async fn users(&self, query: &ListQuery) -> Result<Value> {
        self.get(&query.to_endpoint(USERS)).await
    }

    pub async fn user(&self, id: &str) -> Result<Value> {
        self.get(&resource(USERS, id)).await
    }

    pub async fn bookings(&self, query: &ListQuery) -> Result<Value> {
        self.get(&query.to_endpoint(BOOKINGS)).await
    }

    pub async fn booking(&self, id: &str) -> Result<Value> {
        self.get(&resource(BOOKINGS, id)).await
    }

    pub async fn tours(&self, query: &ListQuery) -> Result<Value> {
        self.get(&query.to_endpoint(TOURS)).await
    }

    pub async fn earnings(&self, query: &ListQuery) -> Result<Value> {
        self.get(&query.to_endpoint(EARNINGS)).await
    }

    pub async fn withdrawals(&self, query: &ListQuery) -> Result<Value> {
        self.get(&query.to_endpoint(WITHDRAWALS)).await
    }

    pub async fn verifications(&self, query: &ListQuery) -> Result<Value> {
        self.get(&query.to_endpoint(VERIFICATIONS)).await
    }

    pub async fn dashboard_stats(&self) -> Result<Value> {
        self.get(&format!("{DASHBOARD}/stats")).await
    }

    pub async fn analytics(&self, period: &str) -> Result<Value> {
        self.get(&format!("{ANALYTICS}?period={}", urlencoding::encode(period)))
            .await
    }

    // ===== Mutations =====

    pub async fn update_user_status(&self, id: &str, status: &str) -> Result<Value> {
        let endpoint = format!("{}/status", resource(USERS, id));
        self.mutate(
            Mutation::UpdateUserStatus,
            Method::Patch,
            &endpoint,
            Some(json!({ "status": status })),
        )
        .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<Value> {
        self.mutate(Mutation::DeleteUser, Method::Delete, &resource(USERS, id), None)
            .await
    }

    pub async fn mark_booking_complete(&self, id: &str) -> Result<Value> {
        let endpoint = format!("{}/complete", resource(BOOKINGS, id));
        self.mutate(Mutation::MarkBookingComplete, Method::Patch, &endpoint, None)
            .await
    }

    pub async fn cancel_booking(&self, id: &str, reason: &str) -> Result<Value> {
        let endpoint = format!("{}/cancel", resource(BOOKINGS, id));
        self.mutate(
            Mutation::CancelBooking,
            Method::Patch,
            &endpoint,
            Some(json!({ "reason": reason })),
        )
        .await
    }

    pub async fn release_payment(&self, booking_id: &str) -> Result<Value> {
        let endpoint = format!("{}/release-payment", resource(BOOKINGS, booking_id));
        self.mutate(Mutation::ReleasePayment, Method::Post, &endpoint, None)
            .await
    }

    pub async fn approve_withdrawal(&self, id: &str) -> Result<Value> {
        let endpoint = format!("{}/approve", resource(WITHDRAWALS, id));
        self.mutate(Mutation::ApproveWithdrawal, Method::Patch, &endpoint, None)
            .await
    }

    pub async fn reject_withdrawal(&self, id: &str, reason: &str) -> Result<Value> {
        let endpoint = format!("{}/reject", resource(WITHDRAWALS, id));
        self.mutate(
            Mutation::RejectWithdrawal,
            Method::Patch,
            &endpoint,
            Some(json!({ "reason": reason })),
        )
        .await
    }

    pub async fn approve_verification(&self, id: &str) -> Result<Value> {
        let endpoint = format!("{}/approve", resource(VERIFICATIONS, id));
        self.mutate(Mutation::ApproveVerification, Method::Patch, &endpoint, None)
            .await
    }

    pub async fn reject_verification(&self, id: &str, reason: &str) -> Result<Value> {
        let endpoint = format!("{}/reject", resource(VERIFICATIONS, id));
        self.mutate(
            Mutation::RejectVerification,
            Method::Patch,
            &endpoint,
            Some(json!({ "reason": reason })),
        )
        .await
    }

    pub async fn update_tour_status(&self, id: &str, status: &str) -> Result<Value> {
        let endpoint = format!("{}/status", resource(TOURS, id));
        self.mutate(
            Mutation::UpdateTourStatus,
            Method::Patch,
            &endpoint,
            Some(json!({ "status": status })),
        )
        .await
    }

    pub async fn delete_tour(&self, id: &str) -> Result<Value> {
        self.mutate(Mutation::DeleteTour, Method::Delete, &resource(TOURS, id), None)
            .await
    }

    /// Sends the write, then invalidates every pattern the mutation affects.
    /// Nothing is invalidated when the write fails.
    async fn mutate(
        &self,
        mutation: Mutation,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let mut options = RequestOptions::new(method);
        if let Some(ref body) = body {
            options = options.with_json(body)?;
        }

        let response = self.request(endpoint, &options).await?;

        for pattern in mutation.invalidation_patterns().iter().copied() {
            self.invalidate_cache(Some(pattern)).await;
        }
        debug!(?mutation, endpoint, "Mutation applied, related cache invalidated");

        Ok(response)
    }
}
