//! API client for the storefront REST API.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::auth::{Credential, SessionManager};
use crate::models::{
    Address, NewAddress, NewProduct, OrderRequest, Product, SignupRequest, SignupResponse,
};

use super::{ApiError, AUTH_TOKEN_HEADER};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Build the shared HTTP client used by the session and the API client
pub fn build_http_client() -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// API client for the storefront.
/// Clone is cheap - it only holds the session, whose parts are Arc-backed.
#[derive(Clone)]
pub struct ApiClient {
    session: SessionManager,
}

impl ApiClient {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Call a protected endpoint with the stored credential attached.
    ///
    /// Fails with `AuthenticationRequired` before touching the network
    /// when no credential is stored.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let credential = self.session.current().ok_or_else(|| {
            debug!(path, "No credential stored, not calling protected endpoint");
            ApiError::AuthenticationRequired
        })?;
        self.send(method, path, body, Some(&credential)).await
    }

    /// Call an endpoint that does not need a credential
    pub async fn request_public<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, None).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        credential: Option<&Credential>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.session.url(path);
        debug!(method = %method, path, authenticated = credential.is_some(), "Sending request");

        let mut request = self
            .session
            .http()
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");
        if let Some(credential) = credential {
            request = request.header(AUTH_TOKEN_HEADER, &credential.value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(method = %method, path, error = %e, "API request failed");
            ApiError::NetworkError(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if let Some(credential) = credential {
                warn!(method = %method, path, "Credential rejected");
                self.session.invalidate(credential);
                return Err(ApiError::SessionExpired);
            }
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method = %method, path, status = status.as_u16(), "API returned an error status");
            return Err(match ApiError::from_status(status, &body) {
                // Without a credential there is no session that could have expired
                ApiError::SessionExpired => ApiError::RequestFailed {
                    status: status.as_u16(),
                    message: ApiError::server_message(&body),
                },
                other => other,
            });
        }

        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} {}: {}", method, path, e)))
    }

    // ===== Account =====

    /// Create an account. Does not sign in.
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<SignupResponse> {
        let response: Option<SignupResponse> = self
            .request_public(Method::POST, "/auth/signup", Some(request))
            .await?;
        Ok(response.unwrap_or_default())
    }

    // ===== Catalog =====

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let products: Option<Vec<Product>> = self.get("/products").await?;
        Ok(products.unwrap_or_default())
    }

    pub async fn get_product(&self, id: &str) -> Result<Product> {
        self.get(&format!("/products/{}", id)).await
    }

    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let categories: Option<Vec<String>> = self.get("/products/categories").await?;
        Ok(categories.unwrap_or_default())
    }

    /// Admin only; the server answers 403 for other users
    pub async fn add_product(&self, product: &NewProduct) -> Result<serde_json::Value> {
        self.post("/products", product).await
    }

    // ===== Address book =====

    pub async fn list_addresses(&self) -> Result<Vec<Address>> {
        let addresses: Option<Vec<Address>> = self.get("/addresses").await?;
        Ok(addresses.unwrap_or_default())
    }

    pub async fn add_address(&self, address: &NewAddress) -> Result<Address> {
        self.post("/addresses", address).await
    }

    // ===== Orders =====

    pub async fn place_order(&self, order: &OrderRequest) -> Result<serde_json::Value> {
        debug!(product_id = %order.product_id, address_id = %order.address_id, quantity = order.quantity, "Placing order");
        self.post("/orders", order).await
    }
}
