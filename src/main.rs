use chrono::{SecondsFormat, Utc};
use jsonrpc_server::{
    build_app, config::Config, logging, AppState, MethodSignature, Namespace, RegistryResolver,
    Reply, ServerBuilder,
};
use serde_json::Value;
use tracing::info;

fn system_namespace() -> Namespace {
    Namespace::new("System")
        .function("ping", MethodSignature::new(), |_args: Vec<Value>| {
            Ok(Reply::new("pong"))
        })
        .function(
            "echo",
            MethodSignature::new().optional("value", Value::Null),
            |args: Vec<Value>| Ok(Reply::new(args.into_iter().next().unwrap_or(Value::Null))),
        )
        .function("time", MethodSignature::new(), |_args: Vec<Value>| {
            let now = Utc::now();
            Ok(Reply::new(now.to_rfc3339_opts(SecondsFormat::Secs, true)).with_last_modified(now))
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let bind_socket = config.bind_socket()?;

    let resolver = RegistryResolver::new().register(system_namespace());
    let server = ServerBuilder::from_config(&config)
        .with_resolver(resolver)
        .build();
    let app = build_app(AppState::new(server));
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        environment = ?config.environment,
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
