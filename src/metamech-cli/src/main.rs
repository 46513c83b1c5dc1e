//! MetaMech site core CLI — support tooling for the ROI estimator and the
//! checkout routing: compute projections, list plans, and dry-run payment
//! resolution without touching the site.

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use metamech_checkout::{OrderDraft, PaymentAction, PaymentMethod, PaymentRouter};
use metamech_core::{PlanCatalog, PlanId, SiteConfig};
use metamech_roi::engine::{self, RoiInputs};

#[derive(Parser, Debug)]
#[command(name = "metamech")]
#[command(about = "MetaMech site core: ROI projections and checkout routing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a savings projection from team parameters
    Roi {
        #[arg(long, default_value_t = 5)]
        engineers: u32,
        #[arg(long, default_value_t = 10.0)]
        hours_saved: f64,
        #[arg(long, default_value_t = 75.0)]
        hourly_cost: f64,
        #[arg(long, default_value_t = 48)]
        weeks_per_year: u32,
        /// Plan whose price becomes the tool cost (overrides --tool-cost)
        #[arg(long, value_enum)]
        plan: Option<PlanIdArg>,
        #[arg(long, default_value_t = 999.0)]
        tool_cost: f64,
    },
    /// List the plan catalog
    Plans,
    /// Dry-run payment routing for a plan and method
    Route {
        #[arg(long, value_enum)]
        plan: PlanIdArg,
        #[arg(long, value_enum)]
        method: MethodArg,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long, default_value = "")]
        address: String,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PlanIdArg {
    Trial,
    Standard,
    Premium,
    Plus,
}

impl From<PlanIdArg> for PlanId {
    fn from(arg: PlanIdArg) -> Self {
        match arg {
            PlanIdArg::Trial => PlanId::Trial,
            PlanIdArg::Standard => PlanId::Standard,
            PlanIdArg::Premium => PlanId::Premium,
            PlanIdArg::Plus => PlanId::Plus,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum MethodArg {
    Card,
    Wallet,
    Invoice,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Card => PaymentMethod::CardRedirect,
            MethodArg::Wallet => PaymentMethod::WalletRedirect,
            MethodArg::Invoice => PaymentMethod::InvoiceRequest,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metamech=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = SiteConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        SiteConfig::default()
    });
    let catalog = PlanCatalog::builtin();

    match cli.command {
        Command::Roi {
            engineers,
            hours_saved,
            hourly_cost,
            weeks_per_year,
            plan,
            tool_cost,
        } => {
            let mut inputs = RoiInputs {
                engineers,
                hours_saved_per_week: hours_saved,
                hourly_cost_eur: hourly_cost,
                working_weeks_per_year: weeks_per_year,
                tool_cost_eur: tool_cost,
            };
            if let Some(plan) = plan {
                inputs = inputs.with_plan(&catalog, plan.into());
            }
            let result = engine::compute(&inputs.sanitised());

            info!(
                weekly = %engine::format_eur(result.weekly_savings),
                annual = %engine::format_eur(result.annual_savings),
                break_even_weeks = result.break_even_weeks,
                "projection computed"
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Plans => {
            let plans: Vec<_> = catalog.iter().collect();
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        Command::Route {
            plan,
            method,
            company,
            name,
            email,
            country,
            address,
        } => {
            let draft = OrderDraft {
                full_name: name,
                company_name: company,
                country,
                address,
                email,
                plan: plan.into(),
                ..OrderDraft::default()
            };
            let router = PaymentRouter::new(catalog, config.payment);
            let action = router.resolve(plan.into(), method.into(), &draft);
            match &action {
                PaymentAction::OpenExternalLink(url) => println!("open {url}"),
                PaymentAction::ComposeEmail { .. } => {
                    if let Some(uri) = action.mailto_uri() {
                        println!("compose {uri}");
                    }
                }
                PaymentAction::ReportError(message) => println!("error: {message}"),
            }
        }
    }

    Ok(())
}
