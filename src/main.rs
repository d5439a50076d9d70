//! Boot demo server.
//!
//! Serves a small employee directory through the Boot dispatcher:
//!
//! ```text
//! GET    /employees/{countryCode}   public, countryCode defaults to NL, ?limit=N
//! POST   /employees                 private ranges only
//! PUT    /employees/{id}            private ranges only
//! DELETE /employees/{id}            private ranges only
//! ```

use axum::http::StatusCode;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tokio::net::TcpListener;

use boot::config::load_or_default;
use boot::http::response::ServiceResponse;
use boot::lifecycle::signals::spawn_signal_handler;
use boot::observability::{logging::init_logging, metrics::init_metrics};
use boot::{
    AccessPolicy, Application, MethodTable, Reply, RouteMatch, RouteOptions, Service, ServiceError,
    ServiceLocator, ServiceRequest, Shutdown,
};

#[derive(Parser)]
#[command(name = "boot-server")]
#[command(about = "Boot HTTP front controller demo", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Employee {
    id: u32,
    name: &'static str,
    country_code: &'static str,
}

struct EmployeeDirectory(Vec<Employee>);

impl EmployeeDirectory {
    fn seeded() -> Self {
        Self(vec![
            Employee {
                id: 1,
                name: "Anna de Vries",
                country_code: "NL",
            },
            Employee {
                id: 2,
                name: "Pieter Jansen",
                country_code: "NL",
            },
            Employee {
                id: 3,
                name: "Claire Martin",
                country_code: "FR",
            },
            Employee {
                id: 4,
                name: "John Smith",
                country_code: "US",
            },
        ])
    }
}

struct EmployeeService {
    directory: std::sync::Arc<EmployeeDirectory>,
}

impl EmployeeService {
    fn all(&self, route: &RouteMatch, request: &ServiceRequest) -> Result<Reply, ServiceError> {
        let country = route.param("countryCode").unwrap_or("NL");
        let limit = match request.query_param("limit") {
            Some(limit) => limit
                .parse()
                .map_err(|_| ServiceError::runtime(format!("invalid limit '{limit}'")))?,
            None => usize::MAX,
        };
        let employees: Vec<&Employee> = self
            .directory
            .0
            .iter()
            .filter(|e| e.country_code == country)
            .take(limit)
            .collect();
        Reply::json(&employees)
    }

    fn create(&self, _: &RouteMatch, request: &ServiceRequest) -> Result<Reply, ServiceError> {
        let _payload: serde_json::Value = serde_json::from_slice(&request.body)?;
        Ok(ServiceResponse::text(StatusCode::CREATED, "ACCEPTED").into())
    }

    fn update(&self, route: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Ok(format!("UPDATED {}", route.param("id").unwrap_or_default()).into())
    }

    fn delete(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Ok(Reply::Empty)
    }
}

impl Service for EmployeeService {
    fn create_service(locator: &ServiceLocator) -> Result<Self, ServiceError> {
        Ok(Self {
            directory: locator.require("employee.directory")?,
        })
    }

    fn methods(table: &mut MethodTable<Self>) {
        table
            .method("all", Self::all)
            .method("create", Self::create)
            .method("update", Self::update)
            .method("delete", Self::delete);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;
    tracing::info!(
        app = %config.app.name,
        environment = %config.app.environment,
        bind_address = %config.listener.bind_address,
        "boot-server starting"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let app = Application::builder(config.clone())
        .component("employee.directory", EmployeeDirectory::seeded())
        .service::<EmployeeService>("employee_service")
        .routes(|routes| {
            routes
                .get(
                    "employees/{countryCode}",
                    "employee_service",
                    "all",
                    RouteOptions::new("employees")
                        .default("countryCode", "NL")
                        .requirement("countryCode", "US|EN|FR|NL"),
                )
                .post(
                    "employees",
                    "employee_service",
                    "create",
                    RouteOptions::new("employee_create")
                        .access_policy(AccessPolicy::for_private_service()),
                )
                .put(
                    "employees/{id}",
                    "employee_service",
                    "update",
                    RouteOptions::new("employee_update")
                        .requirement("id", r"\d+")
                        .access_policy(AccessPolicy::for_private_service()),
                )
                .delete(
                    "employees/{id}",
                    "employee_service",
                    "delete",
                    RouteOptions::new("employee_delete")
                        .requirement("id", r"\d+")
                        .access_policy(AccessPolicy::for_private_service()),
                )
        })
        .build()?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());
    app.serve(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
