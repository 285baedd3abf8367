use axum::{
    extract::{
        rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request, State,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use crate::model::{Claim, ClaimStatus, FoodListing, FoodType, MealType, Provider, Receiver};
use crate::report::{self, chart_for, Analytic, CatalogQuery};
use crate::server::AppState;
use crate::storage::{ListingFilter, ListingFilterOptions, Overview};
use crate::Error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Library error carried to the HTTP boundary
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::ConstraintViolation(_) => StatusCode::CONFLICT,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidValue(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn rejected(text: String) -> ApiError {
    ApiError(Error::InvalidValue(text))
}

/// JSON body whose rejections become 400 `{"error": ...}` responses
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| rejected(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameters, rejected the same way as [`ApiJson`]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.body_text()))?;
        Ok(Self(value))
    }
}

fn message(text: String) -> Json<MessageResponse> {
    Json(MessageResponse { message: text })
}

fn created(text: String) -> (StatusCode, Json<MessageResponse>) {
    (StatusCode::CREATED, message(text))
}

#[derive(Deserialize)]
pub struct CityParams {
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct ListingParams {
    pub city: Option<String>,
    pub food_type: Option<String>,
    pub meal_type: Option<String>,
}

impl ListingParams {
    fn into_filter(self) -> crate::Result<ListingFilter> {
        Ok(ListingFilter {
            city: self.city.filter(|c| !c.is_empty()),
            food_type: self
                .food_type
                .filter(|v| !v.is_empty())
                .map(|v| v.parse::<FoodType>())
                .transpose()?,
            meal_type: self
                .meal_type
                .filter(|v| !v.is_empty())
                .map(|v| v.parse::<MealType>())
                .transpose()?,
        })
    }
}

#[derive(Deserialize)]
pub struct ContactUpdate {
    pub contact: String,
}

#[derive(Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub async fn get_overview(State(state): State<Arc<AppState>>) -> ApiResult<Overview> {
    let store = state.store.lock().await;
    Ok(Json(store.overview()?))
}

pub async fn get_recent(State(state): State<Arc<AppState>>) -> ApiResult<serde_json::Value> {
    let store = state.store.lock().await;
    let recent = store.recent_food_listings(state.recent_limit)?;
    Ok(Json(json!(recent.records())))
}

pub async fn list_catalog() -> Json<serde_json::Value> {
    let entries: Vec<_> = CatalogQuery::all()
        .iter()
        .map(|q| json!({ "number": q.number(), "title": q.title(), "description": q.description() }))
        .collect();
    Json(json!(entries))
}

pub async fn run_catalog(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.store.lock().await;
    let runs: Vec<_> = report::run_all(&store)
        .into_iter()
        .map(|run| run.to_json())
        .collect();
    Json(json!(runs))
}

pub async fn run_catalog_query(
    State(state): State<Arc<AppState>>,
    ApiPath(number): ApiPath<usize>,
) -> ApiResult<serde_json::Value> {
    let query = CatalogQuery::from_number(number)
        .ok_or_else(|| Error::InvalidValue(format!("No catalog query numbered {}", number)))?;
    let store = state.store.lock().await;
    let set = report::run(&store, query)?;
    chart_for(query, &set)?;
    Ok(Json(report::CatalogRun { query, result: Ok(set) }.to_json()))
}

pub async fn run_analytic(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<report::AnalyticRun> {
    let analytic: Analytic = name.parse()?;
    let store = state.store.lock().await;
    Ok(Json(analytic.run(&store)?))
}

pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<CityParams>,
) -> ApiResult<Vec<Provider>> {
    let store = state.store.lock().await;
    let providers = match params.city.as_deref() {
        Some(city) if !city.is_empty() => store.providers_in_city(city)?,
        _ => store.providers()?,
    };
    Ok(Json(providers))
}

pub async fn add_provider(
    State(state): State<Arc<AppState>>,
    ApiJson(provider): ApiJson<Provider>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let store = state.store.lock().await;
    Ok(created(store.insert_provider(&provider)?))
}

pub async fn update_provider_contact(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ContactUpdate>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.update_provider_contact(id, &update.contact)?))
}

pub async fn delete_provider(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.delete_provider(id)?))
}

pub async fn list_receivers(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Receiver>> {
    let store = state.store.lock().await;
    Ok(Json(store.receivers()?))
}

pub async fn add_receiver(
    State(state): State<Arc<AppState>>,
    ApiJson(receiver): ApiJson<Receiver>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let store = state.store.lock().await;
    Ok(created(store.insert_receiver(&receiver)?))
}

pub async fn update_receiver_contact(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ContactUpdate>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.update_receiver_contact(id, &update.contact)?))
}

pub async fn delete_receiver(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.delete_receiver(id)?))
}

pub async fn list_food_listings(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ListingParams>,
) -> ApiResult<Vec<FoodListing>> {
    let filter = params.into_filter()?;
    let store = state.store.lock().await;
    Ok(Json(store.food_listings(&filter)?))
}

pub async fn get_listing_options(State(state): State<Arc<AppState>>) -> ApiResult<ListingFilterOptions> {
    let store = state.store.lock().await;
    Ok(Json(store.listing_filter_options()?))
}

pub async fn add_food_listing(
    State(state): State<Arc<AppState>>,
    ApiJson(listing): ApiJson<FoodListing>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let store = state.store.lock().await;
    Ok(created(store.insert_food_listing(&listing)?))
}

pub async fn update_food_quantity(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<QuantityUpdate>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.update_food_quantity(id, update.quantity)?))
}

pub async fn delete_food_listing(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.delete_food_listing(id)?))
}

pub async fn list_claims(State(state): State<Arc<AppState>>) -> ApiResult<serde_json::Value> {
    let store = state.store.lock().await;
    Ok(Json(json!(store.claims_overview()?.records())))
}

pub async fn add_claim(
    State(state): State<Arc<AppState>>,
    ApiJson(claim): ApiJson<Claim>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let store = state.store.lock().await;
    Ok(created(store.insert_claim(&claim)?))
}

pub async fn update_claim_status(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<MessageResponse> {
    let status: ClaimStatus = update.status.parse()?;
    let store = state.store.lock().await;
    Ok(message(store.update_claim_status(id, status)?))
}

pub async fn delete_claim(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MessageResponse> {
    let store = state.store.lock().await;
    Ok(message(store.delete_claim(id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use crate::storage::FoodStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::util::ServiceExt;

    fn app() -> axum::Router {
        let store = FoodStore::open_in_memory().unwrap();
        build_router(AppState::new(store, 5))
    }

    async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn provider_body() -> serde_json::Value {
        json!({
            "id": 101,
            "name": "Test Cafe",
            "type": "Cafeteria",
            "address": "1 Main St",
            "city": "Springfield",
            "contact": "555-0100"
        })
    }

    #[tokio::test]
    async fn test_overview_on_empty_store() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/overview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["providers"], 0);
        assert_eq!(body["total_quantity"], 0);
    }

    #[tokio::test]
    async fn test_provider_insert_duplicate_and_filter() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/providers", Some(provider_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Provider Test Cafe inserted successfully.");

        let (status, body) = send(&app, Method::POST, "/providers", Some(provider_body())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, Method::GET, "/providers?city=Springfield", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["contact"], "555-0100");
    }

    #[tokio::test]
    async fn test_missing_rows_are_404() {
        let app = app();
        let (status, _) = send(&app, Method::PATCH, "/food-listings/9999/quantity", Some(json!({"quantity": 3}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/claims/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_values_are_400() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/food-listings?food_type=Fried", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/catalog/16", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/analytics/unknown", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_400_with_json_error() {
        let app = app();
        let listing = json!({
            "id": 1,
            "food_name": "Bread",
            "quantity": -1,
            "expiry_date": "2030-01-01",
            "provider_id": 101,
            "provider_type": "Restaurant",
            "location": "Springfield",
            "food_type": "Vegan",
            "meal_type": "Lunch"
        });
        let (status, body) = send(&app, Method::POST, "/food-listings", Some(listing)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid value:"));

        let mut bakery = provider_body();
        bakery["type"] = json!("Bakery");
        let (status, body) = send(&app, Method::POST, "/providers", Some(bakery)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, Method::DELETE, "/providers/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (_, body) = send(&app, Method::GET, "/overview", None).await;
        assert_eq!(body["providers"], 0);
        assert_eq!(body["food_listings"], 0);
    }

    #[tokio::test]
    async fn test_non_positive_ids_are_400() {
        let app = app();
        let mut body = provider_body();
        body["id"] = json!(0);
        let (status, body) = send(&app, Method::POST, "/providers", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid value: Provider ID must be at least 1, got 0");

        let (status, _) = send(&app, Method::DELETE, "/claims/-3", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_catalog_endpoints() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 15);

        let (status, body) = send(&app, Method::GET, "/catalog/5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, "/catalog/all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 15);
        assert!(body[0].get("error").is_none());
    }

    #[tokio::test]
    async fn test_claim_status_update() {
        let app = app();
        let claim = json!({
            "id": 1,
            "food_id": 7,
            "receiver_id": 3,
            "status": "Pending",
            "timestamp": "2025-03-01T10:00:00"
        });
        let (status, _) = send(&app, Method::POST, "/claims", Some(claim)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::PATCH, "/claims/1/status", Some(json!({"status": "completed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Claim 1 status updated to Completed.");

        let (_, body) = send(&app, Method::GET, "/claims", None).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }
}
