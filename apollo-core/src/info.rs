//! Static API metadata served by `/version`, `/about`, and the 404 fallback.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const API_NAME: &str = "Apollo";
pub const API_VERSION: f64 = 1.0;
pub const API_LICENSE: &str = "Apache 2.0";
pub const NOT_FOUND_MESSAGE: &str = "Apollo API endpoint not found.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed for this Apollo API endpoint.";

/// Descriptive metadata about the running API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiInfo {
    pub api_name: String,
    pub version: f64,
    pub author_name: String,
    pub author_email: String,
    pub project_repository: String,
    pub documentation: String,
    pub license: String,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            api_name: API_NAME.to_owned(),
            version: API_VERSION,
            author_name: "Juan A. Aguilar-Jiménez".to_owned(),
            author_email: "juanantonioaguilar@gmail.com".to_owned(),
            project_repository: "https://github.com/jasset75/apollo.github".to_owned(),
            documentation: "http://jasset75.github.io/apollo".to_owned(),
            license: API_LICENSE.to_owned(),
        }
    }
}

impl ApiInfo {
    /// Body of `GET /version`.
    #[must_use]
    pub fn version_body(&self) -> Value {
        json!({
            "status": 200,
            "api_name": self.api_name,
            "version": self.version,
            "license": self.license,
        })
    }

    /// Body of `GET /about`.
    #[must_use]
    pub fn about_body(&self) -> Value {
        json!({
            "api_name": self.api_name,
            "version": self.version,
            "author_name": self.author_name,
            "author_email": self.author_email,
            "project_repository": self.project_repository,
            "documentation": self.documentation,
            "license": self.license,
        })
    }

    /// Body returned for any path without a route.
    #[must_use]
    pub fn not_found_body(&self) -> Value {
        self.fixed_error_body(404, NOT_FOUND_MESSAGE)
    }

    /// Body returned when a route exists but not for the request method.
    #[must_use]
    pub fn method_not_allowed_body(&self) -> Value {
        self.fixed_error_body(405, METHOD_NOT_ALLOWED_MESSAGE)
    }

    fn fixed_error_body(&self, status: u16, message: &str) -> Value {
        json!({
            "status": status,
            "error_message": message,
            "api_name": self.api_name,
            "version": self.version,
            "author": self.author_email,
            "license": self.license,
        })
    }
}
