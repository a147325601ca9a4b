use appflow::application::configurations::FlowConfigurations;
use appflow::application::eligibility::{EligibilityContext, resolve_flow};
use appflow::domain::amounts::Currency;
use appflow::domain::basket::Basket;
use appflow::domain::flow_config::{FlowApp, RequestClass};
use appflow::interfaces::csv::basket_reader::BasketReader;
use appflow::interfaces::json::config_reader::{FlowConfigReader, read_service_registry};
use appflow::logger::init_cli_logger;
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the flow types defined in a flow configuration file
    Types {
        /// Flow configuration JSON file
        #[arg(long)]
        flows: PathBuf,

        /// Only list types of flows started with this request class
        #[arg(long, value_enum)]
        request_class: Option<RequestClassArg>,
    },
    /// Show the stages of a flow and the apps configured for each
    Stages {
        #[arg(long)]
        flows: PathBuf,

        /// Name of the flow
        flow: String,
    },
    /// Resolve which apps take part in a flow given the installed services
    Resolve {
        #[arg(long)]
        flows: PathBuf,

        /// Service declarations JSON file
        #[arg(long)]
        services: PathBuf,

        /// Currency of the transaction
        #[arg(long)]
        currency: Option<String>,

        /// A condition key that holds for this transaction (repeatable)
        #[arg(long = "condition")]
        conditions: Vec<String>,

        flow: String,
    },
    /// Summarise a basket CSV file (label, count, amount[, category])
    Basket { input: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum RequestClassArg {
    Generic,
    Payment,
}

impl From<RequestClassArg> for RequestClass {
    fn from(arg: RequestClassArg) -> Self {
        match arg {
            RequestClassArg::Generic => RequestClass::Generic,
            RequestClassArg::Payment => RequestClass::Payment,
        }
    }
}

fn load_flows(path: &Path) -> Result<FlowConfigurations> {
    let file = File::open(path).into_diagnostic()?;
    let (configs, rejected) = FlowConfigReader::new(file).load().into_diagnostic()?;
    for e in &rejected {
        eprintln!("Skipping flow: {}", e);
    }
    debug!(loaded = configs.len(), rejected = rejected.len(), "flow configurations loaded");
    Ok(configs)
}

fn app_list(apps: &[FlowApp]) -> String {
    apps.iter().map(FlowApp::id).collect::<Vec<_>>().join(", ")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    match cli.command {
        Command::Types {
            flows,
            request_class,
        } => {
            let configs = load_flows(&flows)?;
            for flow_type in configs.get_flow_types(request_class.map(RequestClass::from)) {
                println!("{}", flow_type);
            }
        }
        Command::Stages { flows, flow } => {
            let configs = load_flows(&flows)?;
            let config = configs
                .get_flow_configuration(&flow)
                .ok_or_else(|| miette!("Unknown flow '{}'", flow))?;
            for stage in config.stages() {
                println!("{}: {}", stage.name(), app_list(stage.flow_apps()));
            }
        }
        Command::Resolve {
            flows,
            services,
            currency,
            conditions,
            flow,
        } => {
            let configs = load_flows(&flows)?;
            let config = configs
                .get_flow_configuration(&flow)
                .ok_or_else(|| miette!("Unknown flow '{}'", flow))?;
            let registry =
                read_service_registry(File::open(services).into_diagnostic()?).into_diagnostic()?;
            let currency = currency.map(Currency::new).transpose().into_diagnostic()?;

            let holding: HashSet<String> = conditions.into_iter().collect();
            let context = EligibilityContext::new(
                currency,
                Box::new(move |condition: &str| holding.contains(condition)),
            );
            let resolved = resolve_flow(config, &registry, &context).into_diagnostic()?;
            for stage in &resolved.stages {
                println!("{}: {}", stage.name, app_list(&stage.apps));
            }
        }
        Command::Basket { input } => {
            let file = File::open(input).into_diagnostic()?;
            let mut basket = Basket::new();
            for item in BasketReader::new(file).items() {
                match item {
                    Ok(item) => basket.add_item_merge(item),
                    Err(e) => eprintln!("Error reading basket line: {}", e),
                }
            }
            for item in basket.display_items() {
                println!("{} x{} = {}", item.label, item.count, item.total_amount());
            }
            println!("unique items: {}", basket.number_of_unique_items());
            println!("total items: {}", basket.total_number_of_items());
            println!("total value: {}", basket.total_basket_value());
        }
    }

    Ok(())
}
