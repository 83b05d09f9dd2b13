use clap::Parser;
use colored::Colorize;
use logctx::attr::Attr;
use logctx::context::ContextHandler;
use logctx::error::ContextError;
use logctx::handler::json::JsonHandler;
use logctx::handler::text::TextHandler;
use logctx::handler::Handler;
use logctx::logger::Logger;
use std::sync::Arc;

mod args;
use args::Cli;

// The nested data set the demo walks: states, their cities, their streets.
const STATES: &[(&str, &[(&str, &[&str])])] = &[
    (
        "PA",
        &[
            ("Pittsburgh", &["Main Street", "Babcock Boulevard"]),
            ("Philadelphia", &["Main Street", "Broad Street"]),
        ],
    ),
    ("OH", &[("Columbus", &["High Street"])]),
];

fn main() {
    let cli = Cli::parse();
    let logger = build_logger(&cli);

    for (state, cities) in STATES {
        let state_logger = logger.with(vec![Attr::str("state name", *state)]);
        for (city, streets) in *cities {
            let city_logger = state_logger.with(vec![Attr::str("city name", *city)]);
            for street in *streets {
                let street_logger = city_logger.with(vec![Attr::str("street name", *street)]);
                street_logger.info("processing street", vec![]);
                // The message needs no street details; the logging context
                // carries them into the error on its own.
                let err = ContextError::new(&street_logger, "error on this street");
                println!("{}", err.to_string().red());
            }
        }
    }
}

fn build_logger(cli: &Cli) -> Logger {
    let base: Arc<dyn Handler> = if cli.json {
        Arc::new(JsonHandler::stderr().with_min_level(cli.level))
    } else {
        Arc::new(TextHandler::stderr().with_min_level(cli.level))
    };
    Logger::new(Arc::new(ContextHandler::new(base)))
}
