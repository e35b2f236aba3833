//! Provider routing for model invocation.
//!
//! The `ProviderRouter` is the production [`ModelInvoker`]. It is
//! responsible for:
//! - Resolving a model identifier to its provider
//! - Dispatching to a live adapter when one exists and a credential is set
//! - Falling back to a labelled substitute result otherwise
//! - Turning adapter failures into `"Error: ..."` payloads

use crate::agents::adapters::{GeminiAdapter, SubstituteInvoker};
use crate::agents::base::{Invocation, InvocationRequest, InvokeError, ModelInvoker};
use ar_protocol::{GlobalConfig, Provider};
use async_trait::async_trait;
use std::time::Duration;

/// How a request will be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A real provider call.
    Live(Provider),
    /// A labelled substitute result.
    Substitute {
        provider: Provider,
        reason: SubstituteReason,
    },
}

/// Why a request is served by the substitute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstituteReason {
    /// The provider has a live adapter but no credential is set.
    MissingCredential,
    /// The provider has no live adapter in this build.
    NoLivePath,
    /// The model identifier is not in the model table.
    UnknownModel,
}

/// Routes each request to a live adapter or to the substitute.
pub struct ProviderRouter {
    gemini: Option<GeminiAdapter>,
    substitute: SubstituteInvoker,
}

impl ProviderRouter {
    /// Create a router from its adapters.
    ///
    /// With `gemini` set to `None`, every request is served by the
    /// substitute.
    pub fn new(gemini: Option<GeminiAdapter>, substitute: SubstituteInvoker) -> Self {
        Self { gemini, substitute }
    }

    /// Build the router described by the global configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for a live adapter cannot be built.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, InvokeError> {
        let gemini = GeminiAdapter::new(
            config.gemini_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let substitute = SubstituteInvoker::new(
            Duration::from_millis(config.substitute_delay_ms),
            config.substitute_token_overhead,
        );

        Ok(Self::new(Some(gemini), substitute))
    }

    /// Decide how `request` will be served, without serving it.
    pub fn route(&self, request: &InvocationRequest) -> Route {
        let provider = request.provider();

        match provider {
            Provider::Gemini if self.gemini.is_some() => {
                if request.credentials.has(provider) {
                    Route::Live(provider)
                } else {
                    Route::Substitute {
                        provider,
                        reason: SubstituteReason::MissingCredential,
                    }
                }
            }
            Provider::Unknown => Route::Substitute {
                provider,
                reason: SubstituteReason::UnknownModel,
            },
            _ => Route::Substitute {
                provider,
                reason: SubstituteReason::NoLivePath,
            },
        }
    }
}

#[async_trait]
impl ModelInvoker for ProviderRouter {
    async fn invoke(&self, request: &InvocationRequest) -> Invocation {
        match (self.route(request), self.gemini.as_ref()) {
            (Route::Live(Provider::Gemini), Some(gemini)) => {
                match gemini.generate(request).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!("[{}] {} call failed: {}", request.model_id, Provider::Gemini, e);
                        Invocation::error(Provider::Gemini.label(), e)
                    }
                }
            }
            (Route::Substitute { provider, reason }, _) => {
                tracing::debug!(
                    "[{}] serving substitute result ({:?})",
                    request.model_id,
                    reason
                );
                self.substitute.generate(request, provider.label()).await
            }
            (route, _) => {
                // a live route without its adapter cannot be produced by `route`
                Invocation::error(
                    request.provider().label(),
                    format!("no adapter for route {route:?}"),
                )
            }
        }
    }
}
