use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "debug,forest_trade_equilibrium=debug"
    } else {
        "info,forest_trade_equilibrium=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
