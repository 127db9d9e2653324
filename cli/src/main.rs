//! EPP desk CLI - register and audit PPE deliveries from the terminal

mod tui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use epp_desk::views::{RegistrationView, SearchView};
use epp_desk::{EppClient, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "epp-desk")]
#[command(about = "Register and audit personal protective equipment deliveries")]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, env = "EPP_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the EPP API (default: http://localhost:4000)
    #[arg(short = 'u', long, env = "EPP_API_URL")]
    api_url: Option<String>,

    /// Name of the person issuing equipment
    #[arg(short, long, env = "EPP_ISSUER_NAME")]
    issuer: Option<String>,

    /// Directory for exported PDFs
    #[arg(short, long, env = "EPP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive terminal UI (default)
    Ui,

    /// Look up a worker by national ID
    Worker {
        /// Worker national ID (cédula)
        cedula: String,
    },

    /// Show a worker's delivery history
    History {
        /// Worker national ID (cédula)
        cedula: String,

        /// Also export the history as PDF
        #[arg(long)]
        pdf: bool,
    },

    /// Register a delivery (non-interactive)
    Register {
        /// Worker national ID (cédula)
        #[arg(short, long)]
        cedula: String,

        /// Equipment delivered
        #[arg(short, long)]
        epp: String,

        /// Reference or justification
        #[arg(short, long)]
        referencia: String,

        /// Units delivered
        #[arg(short = 'n', long, default_value = "1")]
        cantidad: String,

        /// Task or labor the equipment is for
        #[arg(short, long)]
        labor: String,
    },
}

impl Cli {
    /// Settings file and environment first, then flags
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(url) = &self.api_url {
            settings.set_api_url(url)?;
        }
        if self.issuer.is_some() {
            settings.set_issuer_name(self.issuer.clone());
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing on stderr so it stays out of command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epp_desk=info,epp_desk_cli=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let client = EppClient::new(settings.api_base_url.clone());
    tracing::debug!(api = %client.base_url(), "Using EPP API");

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => tui::run(client, settings).await,
        Commands::Worker { cedula } => run_worker(&client, &cedula).await,
        Commands::History { cedula, pdf } => run_history(client, &settings, cedula, pdf).await,
        Commands::Register {
            cedula,
            epp,
            referencia,
            cantidad,
            labor,
        } => {
            let mut view = RegistrationView::new(client, settings.issuer_name.clone());
            view.set_cedula(cedula);
            view.set_epp_entregado(epp);
            view.set_referencia_tipo(referencia);
            view.set_unidades_entregadas(cantidad);
            view.set_tarea_labor(labor);
            run_register(view).await
        }
    }
}

async fn run_worker(client: &EppClient, cedula: &str) -> Result<()> {
    let worker = client.find_worker(cedula).await?;

    println!("{}", worker.full_name());
    println!("{:─<60}", "");
    println!("  Cédula:              {}", worker.cedula);
    println!("  Área:                {}", worker.area);
    println!("  Labor:               {}", worker.labor);
    println!("  Cargo:               {}", worker.cargo);
    println!("  Empresa:             {}", worker.empresa);
    println!("  Contacto:            {}", worker.contacto);
    println!("  Centro de operación: {}", worker.centro_de_operacion);

    Ok(())
}

async fn run_history(
    client: EppClient,
    settings: &Settings,
    cedula: String,
    pdf: bool,
) -> Result<()> {
    let mut view = SearchView::new(client);
    view.set_cedula(cedula);
    view.search().await.map_err(|n| anyhow!("{}", n))?;

    if let Some(worker) = view.worker() {
        println!("{} ({})", worker.full_name(), worker.cedula);
    }

    let rows = view.rows();
    if rows.is_empty() {
        println!("No deliveries found.");
    } else {
        println!("{:─<60}", "");
        for row in &rows {
            println!(
                "  #{} {} - {} x{} ({})",
                row.number, row.fecha, row.epp_entregado, row.unidades, row.referencia_tipo
            );
            println!(
                "      Entrega: {} | Labor: {}",
                row.nombre_hs_entrega, row.tarea_labor
            );
        }
    }

    if pdf {
        let path = view
            .export_pdf(&settings.output_dir)
            .map_err(|n| anyhow!("{}", n))?;
        println!("Saved {}", path.display());
    }

    Ok(())
}

async fn run_register(mut view: RegistrationView) -> Result<()> {
    let worker = view.lookup_worker().await.map_err(|n| anyhow!("{}", n))?;
    println!("Registering delivery for {}...", worker.full_name());

    let sent = view.submit().await.map_err(|n| anyhow!("{}", n))?;
    println!("{}", RegistrationView::registered_notice());
    println!(
        "  {} x{} at {}",
        sent.epp_entregado,
        sent.unidades_entregadas,
        sent.fecha_entrega.format("%Y-%m-%d %H:%M")
    );

    Ok(())
}
