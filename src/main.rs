use std::sync::Arc;

use anyhow::{Context, Result};
use uuid::Uuid;

use qti_session::{
    cli::args_from_env,
    config::{Config, SinkConfig},
    engine::{Route, RouteEngine},
    logging::init_tracing,
    replay::{ReplayScript, run_steps},
    session::{ResultSinkPort, TestSession},
    sink::{MemoryResultSink, NdjsonResultSink, NoopResultSink},
};

fn main() -> Result<()> {
    let args = args_from_env()?;
    let config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    let logging_guard = init_tracing(&config.logging)?;

    let script = ReplayScript::load(&args.script_path)?;
    let session_id = script
        .session_id
        .clone()
        .unwrap_or_else(|| format!("{}-{}", config.session.session_id_prefix, Uuid::now_v7()));
    let navigation_mode = script
        .navigation_mode
        .unwrap_or(config.session.navigation_mode);

    let sink: Arc<dyn ResultSinkPort> = match &config.sink {
        SinkConfig::Memory => Arc::new(MemoryResultSink::new()),
        SinkConfig::Noop => Arc::new(NoopResultSink),
        SinkConfig::Ndjson { path } => Arc::new(NdjsonResultSink::new(path.clone())),
    };

    let _session_span = logging_guard.session_span(&session_id).entered();

    let engine = RouteEngine::new(
        session_id.clone(),
        navigation_mode,
        Route::from(script.route),
    );
    let mut session = TestSession::new(Box::new(engine), sink);
    session
        .begin()
        .with_context(|| format!("failed to begin session {session_id}"))?;

    let summary = run_steps(&mut session, script.steps);

    eprintln!(
        "session {} finished as {}: {} attempts recorded, {} variables delivered, {} steps rejected",
        session_id,
        session.state(),
        summary.recorded_attempts,
        summary.delivered_variables,
        summary.rejected_steps.len()
    );
    for (step, kind) in &summary.rejected_steps {
        eprintln!("  step {step}: {kind:?}");
    }
    Ok(())
}
