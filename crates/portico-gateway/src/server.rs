// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up plugin routes, the health endpoint and middleware.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;

use axum::{
    http::{HeaderMap, Method, Uri},
    routing::{get, on, MethodFilter, MethodRouter},
    Router,
};
use portico_core::{PorticoError, ResponseFormat};
use portico_plugin::{
    capture_name, validate_plugin_name, validate_route_path, PluginRegistry, RouteMethod,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::controller::ControllerTable;
use crate::handlers::{self, RouteState};

/// Path of the unauthenticated health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Health state for the unauthenticated health endpoint.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Number of enabled plugins.
    pub plugins: usize,
}

/// Gateway server configuration (mirrors `[server]` from portico-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` as passed to the listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn method_filter(method: RouteMethod) -> MethodFilter {
    match method {
        RouteMethod::Get => MethodFilter::GET,
        RouteMethod::Post => MethodFilter::POST,
        RouteMethod::Put => MethodFilter::PUT,
        RouteMethod::Patch => MethodFilter::PATCH,
        RouteMethod::Delete => MethodFilter::DELETE,
    }
}

/// Paths a plugin route is served on.
///
/// A route on `/` answers both `/{plugin}` and `/{plugin}/`.
fn mount_paths(plugin: &str, path: &str) -> Vec<String> {
    if path == "/" {
        vec![format!("/{plugin}"), format!("/{plugin}/")]
    } else {
        vec![format!("/{plugin}{path}")]
    }
}

/// Capture names already mounted, keyed by the path prefix in front of them.
///
/// The router allows a single capture name per position, so `/p/{a}` and
/// `/p/{b}/edit` cannot both be served.
#[derive(Default)]
struct CaptureIndex {
    names: HashMap<String, String>,
}

impl CaptureIndex {
    fn claim(&mut self, plugin: &str, path: &str) -> Result<(), PorticoError> {
        let mut prefix = String::new();
        for segment in path.split('/').skip(1) {
            match capture_name(segment) {
                Some(name) => {
                    let known = self
                        .names
                        .entry(prefix.clone())
                        .or_insert_with(|| name.to_string());
                    if known.as_str() != name {
                        return Err(PorticoError::Config(format!(
                            "plugin `{plugin}` route {path} captures `{name}` where another \
                             route already captures `{known}`"
                        )));
                    }
                    prefix.push_str("/{}");
                }
                None => {
                    prefix.push('/');
                    prefix.push_str(segment);
                }
            }
        }
        Ok(())
    }
}

/// Build the gateway router.
///
/// Every route of every enabled plugin is mounted at `/{plugin}{path}` and
/// bound to the action `controllers` holds for its handler name. A route
/// naming an unbound handler, a plugin name or route path the router cannot
/// mount, and two routes claiming the same method and path or capturing
/// different names at the same position are all configuration errors.
pub fn build_router(
    registry: &PluginRegistry,
    controllers: &ControllerTable,
    format: ResponseFormat,
    health: HealthState,
) -> Result<Router, PorticoError> {
    let mut routes: BTreeMap<String, MethodRouter> = BTreeMap::new();
    let mut claimed: HashSet<(RouteMethod, String)> = HashSet::new();
    let mut captures = CaptureIndex::default();

    for entry in registry.enabled() {
        let plugin = entry.manifest.name.as_str();
        validate_plugin_name(plugin)?;
        for route in &entry.manifest.routes {
            validate_route_path(&route.path)?;
            let action = controllers.get(plugin, &route.handler).ok_or_else(|| {
                PorticoError::Config(format!(
                    "plugin `{plugin}` binds {} {} to unknown handler `{}`",
                    route.method, route.path, route.handler
                ))
            })?;
            let state = RouteState {
                label: format!("{plugin}:{}", route.handler),
                action,
                format,
            };

            for path in mount_paths(plugin, &route.path) {
                if path == HEALTH_PATH || !claimed.insert((route.method, path.clone())) {
                    return Err(PorticoError::Config(format!(
                        "plugin `{plugin}` route {} {path} is already taken",
                        route.method
                    )));
                }
                captures.claim(plugin, &path)?;

                let state = state.clone();
                let handler = move |method: Method, uri: Uri, headers: HeaderMap| {
                    let state = state.clone();
                    async move { handlers::dispatch(state, method, uri, headers).await }
                };
                let filter = method_filter(route.method);
                let method_router = match routes.remove(&path) {
                    Some(existing) => existing.on(filter, handler),
                    None => on(filter, handler),
                };
                debug!(plugin, method = %route.method, %path, handler = %route.handler, "route mounted");
                routes.insert(path, method_router);
            }
        }
    }

    let plugin_routes = routes
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(&path, method_router)
        });

    let public_routes = Router::new()
        .route(HEALTH_PATH, get(handlers::get_health))
        .with_state(health);

    Ok(Router::new()
        .merge(public_routes)
        .merge(plugin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}

/// Serve `app` on the configured address until `shutdown` completes.
///
/// In-flight requests are drained before this returns.
pub async fn start_server<F>(
    config: &ServerConfig,
    app: Router,
    shutdown: F,
) -> Result<(), PorticoError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PorticoError::Server {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or(addr);
    info!("Gateway server listening on {local}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PorticoError::Server {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use portico_core::{RequestContext, WELCOME_PLUGIN};
    use portico_plugin::{
        Plugin, PluginManifest, PluginStatus, RouteSpec, ServiceTable, WelcomePlugin,
    };

    use super::*;

    /// A plugin serving the given `(method, path, handler)` routes.
    struct RoutedPlugin {
        name: &'static str,
        routes: Vec<(RouteMethod, &'static str, &'static str)>,
    }

    #[async_trait]
    impl Plugin for RoutedPlugin {
        fn manifest(&self) -> PluginManifest {
            PluginManifest {
                name: self.name.to_string(),
                version: "0.1.0".to_string(),
                description: "test routes".to_string(),
                author: None,
                min_portico_version: None,
                services: vec![],
                routes: self
                    .routes
                    .iter()
                    .map(|(method, path, handler)| RouteSpec {
                        method: *method,
                        path: path.to_string(),
                        handler: handler.to_string(),
                    })
                    .collect(),
            }
        }

        fn register(&self, _services: &mut ServiceTable) {}
    }

    fn routed(
        name: &'static str,
        routes: Vec<(RouteMethod, &'static str, &'static str)>,
    ) -> Result<Router, PorticoError> {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(RoutedPlugin {
            name,
            routes: routes.clone(),
        }));
        let mut controllers = ControllerTable::new();
        for (_, _, handler) in routes {
            controllers.insert(
                name,
                handler,
                Arc::new(|ctx: &mut RequestContext| {
                    ctx.set_body("ok");
                    Ok(())
                }),
            );
        }
        build_router(&registry, &controllers, ResponseFormat::Text, health())
    }

    fn config_message(result: Result<Router, PorticoError>) -> String {
        match result {
            Err(PorticoError::Config(msg)) => msg,
            Err(other) => panic!("expected Config, got {other:?}"),
            Ok(_) => panic!("expected Config, router was built"),
        }
    }

    fn health() -> HealthState {
        HealthState {
            start_time: std::time::Instant::now(),
            plugins: 1,
        }
    }

    #[test]
    fn root_route_mounts_with_and_without_slash() {
        assert_eq!(
            mount_paths("my-plugin", "/"),
            vec!["/my-plugin".to_string(), "/my-plugin/".to_string()]
        );
        assert_eq!(mount_paths("my-plugin", "/about"), vec!["/my-plugin/about".to_string()]);
    }

    #[test]
    fn method_filter_covers_every_route_method() {
        assert_eq!(method_filter(RouteMethod::Get), MethodFilter::GET);
        assert_eq!(method_filter(RouteMethod::Delete), MethodFilter::DELETE);
    }

    #[test]
    fn builds_router_for_welcome_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(WelcomePlugin::new("Welcome!").unwrap()));
        let controllers = ControllerTable::builtin(&registry).unwrap();
        assert!(build_router(&registry, &controllers, ResponseFormat::Text, health()).is_ok());
    }

    #[test]
    fn unbound_handler_is_config_error() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(WelcomePlugin::new("Welcome!").unwrap()));
        let err = build_router(&registry, &ControllerTable::new(), ResponseFormat::Text, health())
            .unwrap_err();
        match err {
            PorticoError::Config(msg) => assert!(msg.contains("controller.index"), "got: {msg}"),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn disabled_plugin_needs_no_controller() {
        let mut registry = PluginRegistry::new();
        registry.register_with_status(
            Box::new(WelcomePlugin::new("Welcome!").unwrap()),
            PluginStatus::Disabled,
        );
        assert!(
            build_router(&registry, &ControllerTable::new(), ResponseFormat::Text, health())
                .is_ok()
        );
    }

    #[test]
    fn extra_bindings_are_ignored() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(WelcomePlugin::new("Welcome!").unwrap()));
        let mut controllers = ControllerTable::builtin(&registry).unwrap();
        controllers.insert(
            WELCOME_PLUGIN,
            "controller.unused",
            Arc::new(|ctx: &mut RequestContext| {
                ctx.set_body("unused");
                Ok(())
            }),
        );
        assert!(build_router(&registry, &controllers, ResponseFormat::Json, health()).is_ok());
    }

    #[test]
    fn colon_segment_is_config_error() {
        let msg = config_message(routed("items", vec![(RouteMethod::Get, "/:id", "items.show")]));
        assert!(msg.contains("unsupported segment"), "got: {msg}");
    }

    #[test]
    fn catch_all_segment_is_config_error() {
        let msg = config_message(routed(
            "items",
            vec![(RouteMethod::Get, "/files/*rest", "items.file")],
        ));
        assert!(msg.contains("unsupported segment"), "got: {msg}");
    }

    #[test]
    fn differently_named_captures_conflict() {
        let msg = config_message(routed(
            "items",
            vec![
                (RouteMethod::Get, "/{a}", "items.show"),
                (RouteMethod::Delete, "/{b}", "items.remove"),
            ],
        ));
        assert!(msg.contains("captures `b`"), "got: {msg}");
        assert!(msg.contains("`a`"), "got: {msg}");
    }

    #[test]
    fn nested_capture_conflict_is_detected() {
        let msg = config_message(routed(
            "items",
            vec![
                (RouteMethod::Get, "/{id}", "items.show"),
                (RouteMethod::Get, "/{key}/edit", "items.edit"),
            ],
        ));
        assert!(msg.contains("captures `key`"), "got: {msg}");
    }

    #[test]
    fn same_capture_name_shared_across_methods() {
        assert!(routed(
            "items",
            vec![
                (RouteMethod::Get, "/{id}", "items.show"),
                (RouteMethod::Delete, "/{id}", "items.remove"),
                (RouteMethod::Get, "/{id}/edit", "items.edit"),
            ],
        )
        .is_ok());
    }

    #[test]
    fn plugin_name_with_brace_is_config_error() {
        let msg = config_message(routed("p{x", vec![(RouteMethod::Get, "/", "p.index")]));
        assert!(msg.contains("plugin name"), "got: {msg}");
    }

    #[test]
    fn capture_index_tracks_prefixes() {
        let mut index = CaptureIndex::default();
        assert!(index.claim("a", "/a/{id}").is_ok());
        assert!(index.claim("b", "/b/{key}").is_ok());
        assert!(index.claim("a", "/a/static").is_ok());
        assert!(index.claim("a", "/a/{other}").is_err());
    }

    #[test]
    fn server_config_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 1337,
        };
        assert_eq!(config.addr(), "127.0.0.1:1337");
        assert!(format!("{config:?}").contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn server_stops_when_shutdown_completes() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let result = start_server(&config, Router::new(), std::future::ready(())).await;
        assert!(result.is_ok());
    }
}
