//! Configuration diagnostics.
//!
//! ```text
//! GET /api/debug/env
//! GET /api/debug/backend
//! ```
//!
//! Reports are computed once at startup from the process environment. They
//! state whether each variable is present and how long it is; values are
//! never echoed.

use std::time::Duration;

use actix_web::{HttpResponse, get, web};
use mockable::Env;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::cache_control::private_no_store_header;
use crate::outbound::backend::{
    BACKEND_API_KEY_ENV, BACKEND_URL_ENV, BackendConfig, BackendHandle,
};

const REPORTED_VARIABLES: [&str; 2] = [BACKEND_URL_ENV, BACKEND_API_KEY_ENV];

/// Presence report for one environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarReport {
    /// Variable name.
    #[schema(example = "BACKEND_URL")]
    pub name: String,
    /// Whether the variable is set to a non-blank value.
    pub present: bool,
    /// Length of the value in bytes, zero when absent.
    pub length: usize,
}

/// Whether a backend handle can be built from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendReport {
    /// A handle was built successfully.
    pub configured: bool,
    /// Host of the configured backend URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "project.example.co")]
    pub host: Option<String>,
    /// Why the handle could not be built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Diagnostics snapshot served by the debug endpoints.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    env: Vec<EnvVarReport>,
    backend: BackendReport,
}

impl Diagnostics {
    /// Inspect the environment and attempt to build a backend handle.
    pub fn collect<E: Env>(env: &E, timeout: Duration) -> Self {
        let reports = REPORTED_VARIABLES
            .iter()
            .map(|name| {
                let length = env
                    .string(name)
                    .map(|value| value.trim().len())
                    .unwrap_or_default();
                EnvVarReport {
                    name: (*name).to_owned(),
                    present: length > 0,
                    length,
                }
            })
            .collect();

        let backend = match BackendConfig::from_env(env) {
            Ok(config) => match BackendHandle::new(&config, timeout) {
                Ok(handle) => BackendReport {
                    configured: true,
                    host: handle.base_url().host_str().map(str::to_owned),
                    error: None,
                },
                Err(error) => BackendReport {
                    configured: false,
                    host: config.url().host_str().map(str::to_owned),
                    error: Some(error.to_string()),
                },
            },
            Err(error) => BackendReport {
                configured: false,
                host: None,
                error: Some(error.to_string()),
            },
        };

        Self {
            env: reports,
            backend,
        }
    }

    /// Per-variable presence reports.
    pub fn env(&self) -> &[EnvVarReport] {
        &self.env
    }

    /// Backend handle report.
    pub fn backend(&self) -> &BackendReport {
        &self.backend
    }
}

/// Report which configuration variables are set.
#[utoipa::path(
    get,
    path = "/api/debug/env",
    responses((status = 200, description = "Presence and length per variable", body = [EnvVarReport])),
    tags = ["diagnostics"],
    operation_id = "debugEnv",
    security([])
)]
#[get("/env")]
pub async fn env_report(diagnostics: web::Data<Diagnostics>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(diagnostics.env())
}

/// Report whether a backend handle can be built.
#[utoipa::path(
    get,
    path = "/api/debug/backend",
    responses((status = 200, description = "Backend handle status", body = BackendReport)),
    tags = ["diagnostics"],
    operation_id = "debugBackend",
    security([])
)]
#[get("/backend")]
pub async fn backend_report(diagnostics: web::Data<Diagnostics>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(diagnostics.backend())
}
