//! Per-resource convenience calls.
//!
//! Each method is a fixed endpoint path plus pagination parameters handed to
//! [`ApiClient::scheduled_call`]; none of them adds behavior of its own.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiHttpClient, HttpMethod},
	query::QueryParams,
};

fn page(number: u32, size: u32) -> QueryParams {
	QueryParams::new().with("page[number]", number).with("page[size]", size)
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Lists campuses (`GET /v2/campus`).
	pub async fn campus(&self) -> Result<Value> {
		self.get("/v2/campus", QueryParams::new().with("page[size]", 100)).await
	}

	/// Lists coalitions (`GET /v2/coalitions`).
	pub async fn coalitions(&self, page_number: u32, page_size: u32) -> Result<Value> {
		self.get("/v2/coalitions", page(page_number, page_size)).await
	}

	/// Lists cursus (`GET /v2/cursus`).
	pub async fn cursus(&self) -> Result<Value> {
		self.get("/v2/cursus", QueryParams::new().with("page[size]", 100)).await
	}

	/// Lists projects (`GET /v2/projects`).
	pub async fn projects(&self, page_number: u32, page_size: u32) -> Result<Value> {
		self.get("/v2/projects", page(page_number, page_size)).await
	}

	/// Lists the sub-projects of a project (`GET /v2/projects/{id}/projects`).
	pub async fn sub_projects(&self, project_id: u64) -> Result<Value> {
		self.get(
			format!("/v2/projects/{project_id}/projects"),
			QueryParams::new().with("page[size]", 30),
		)
		.await
	}

	/// Lists cursus enrollments still in progress (`GET /v2/cursus_users`).
	///
	/// `filter[end]=false` travels as the bare `filter[end]` key.
	pub async fn users_cursus(&self, page_number: u32, page_size: u32) -> Result<Value> {
		self.get("/v2/cursus_users", page(page_number, page_size).with("filter[end]", false)).await
	}

	/// Lists locations whose `begin_at` lies in `[start, end]`, oldest first
	/// (`GET /v2/locations`).
	pub async fn locations(
		&self,
		page_number: u32,
		page_size: u32,
		start: &str,
		end: &str,
	) -> Result<Value> {
		let params = QueryParams::new()
			.with("sort", "begin_at")
			.with("page[number]", page_number)
			.with("page[size]", page_size)
			.with("range[begin_at]", format!("{start},{end}"));

		self.get("/v2/locations", params).await
	}

	/// Fetches one location (`GET /v2/locations/{id}`).
	pub async fn location(&self, id: u64) -> Result<Value> {
		self.scheduled_call(format!("/v2/locations/{id}"), HttpMethod::Get, None).await
	}

	/// Lists coalition memberships (`GET /v2/coalitions_users`).
	pub async fn users_coalitions(&self, page_number: u32, page_size: u32) -> Result<Value> {
		self.get("/v2/coalitions_users", page(page_number, page_size)).await
	}

	/// Lists registered applications (`GET /v2/apps`).
	pub async fn apps(&self, page_number: u32, page_size: u32) -> Result<Value> {
		self.get("/v2/apps", page(page_number, page_size)).await
	}

	/// Lists users whose id lies in `[from_id, from_id + 10000]` (`GET /v2/users`).
	pub async fn users(&self, page_number: u32, page_size: u32, from_id: u64) -> Result<Value> {
		let params = page(page_number, page_size)
			.with("range[id]", format!("{from_id},{}", from_id.saturating_add(10_000)));

		self.get("/v2/users", params).await
	}

	/// Fetches one user (`GET /v2/users/{id}`).
	pub async fn user(&self, id: u64) -> Result<Value> {
		self.scheduled_call(format!("/v2/users/{id}"), HttpMethod::Get, None).await
	}

	async fn get(&self, endpoint: impl Into<String>, params: QueryParams) -> Result<Value> {
		self.scheduled_call(endpoint, HttpMethod::Get, Some(params)).await
	}
}
