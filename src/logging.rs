use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(env: &Environment, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            return "study_planner_client=debug,study_planner=debug,reqwest=debug,info".into();
        }
        // Default log levels based on environment
        match env {
            Environment::Dev => "study_planner_client=debug,study_planner=debug,reqwest=info,info".into(),
            Environment::Staging => "study_planner_client=debug,study_planner=info,reqwest=info,info".into(),
            Environment::Prod => "study_planner_client=info,study_planner=info,reqwest=warn,warn".into(),
        }
    });

    // stdout carries the rendered page
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    // Use JSON format in production, pretty format in dev
    if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    tracing::debug!("Logging initialized for {:?} environment", env);
}
