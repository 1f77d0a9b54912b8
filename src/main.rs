use std::process;

pub mod config;
pub mod probe;
pub mod report;
pub mod suite;

use config::app_config;
use config::plan::SuiteKind;
use suite::SuiteContext;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match app_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("configuration error: {e}");
            process::exit(2);
        }
    };

    let client = match app_config::build_client(&config.plan) {
        Ok(client) => client,
        Err(e) => {
            log::error!("failed to build HTTP client: {e}");
            process::exit(2);
        }
    };

    report::run_header(&config);

    let ctx = SuiteContext {
        client: &client,
        config: &config,
    };

    // strictly sequential: one probe at a time, suites in plan order, and
    // no probe outcome ever aborts the run
    let mut reports = Vec::new();
    for kind in &config.plan.suites {
        let suite_report = match kind {
            SuiteKind::Auth => suite::auth::run(&ctx).await,
            SuiteKind::Chat => suite::chat::run(&ctx).await,
            SuiteKind::Admin => suite::admin::run(&ctx).await,
            SuiteKind::Diagnose => suite::diagnose::run(&ctx).await,
        };
        reports.push(suite_report);
    }

    report::summary(&reports);
}
