use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{debug, info, warn};
use owo_colors::OwoColorize;
use secrecy::SecretString;

use exos_configurator::driver::{ApplyReport, CommandInterface, DriverBuilder, DryRun, ExosDriver, apply_plan};
use exos_configurator::error::{ChannelError, ConfigError, Error, Result};
use exos_configurator::firmware::{FirmwareStatus, check_firmware};
use exos_configurator::plan::{Command, CommandPlan, Profile};
use exos_configurator::session::{Collector, Outcome, Preflight, Prompter, TerminalPrompter};
use exos_configurator::transport::HostKeyVerification;
use exos_configurator::SiteConfig;

/// Build and apply a baseline configuration to an ExtremeXOS switch or stack.
#[derive(Debug, Parser)]
#[command(name = "exos-configurator", version, about)]
struct Cli {
    /// Menu and command set to use
    #[arg(long, value_enum, default_value_t = Profile::Full)]
    profile: Profile,

    /// Switch management address to connect to
    #[arg(long, required_unless_present = "dry_run")]
    host: Option<String>,

    #[arg(long, default_value_t = 22)]
    port: u16,

    #[arg(long, short, default_value = "admin")]
    username: String,

    /// Private key for authentication instead of a password
    #[arg(long)]
    key: Option<PathBuf>,

    /// Login password; prompted for when unset
    #[arg(long, env = "EXOS_CFG_PASSWORD", hide_env_values = true, hide = true)]
    password: Option<String>,

    /// Private key passphrase
    #[arg(long, env = "EXOS_CFG_KEY_PASSPHRASE", hide_env_values = true, hide = true)]
    key_passphrase: Option<String>,

    #[arg(long = "host-key", value_enum, default_value = "accept-new")]
    host_key: HostKeyVerification,

    /// Connect and per-command timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print the commands instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Site configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let site = SiteConfig::load(cli.config.as_deref())?;
    debug!("site config: {} sites, {} default VLANs", site.sites.len(), site.vlans.len());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut collector = Collector::new(cli.profile, &site, TerminalPrompter::new());

    if cli.profile == Profile::Full {
        match collector.preflight()? {
            Preflight::Ready(_) => {}
            Preflight::Stop => return Ok(()),
            Preflight::EnableStacking => {
                if cli.dry_run {
                    println!("enable stacking");
                    return Ok(());
                }
                return runtime.block_on(enable_stacking(&cli));
            }
        }
    }

    let plan = match collector.run()? {
        Outcome::Build(plan) => plan,
        Outcome::Exit => {
            info!("exiting without building");
            return Ok(());
        }
    };

    runtime.block_on(async {
        if cli.dry_run {
            let mut dry = DryRun::new().echo(true);
            let report = apply_plan(&mut dry, &plan).await;
            print_report(&report);
            return Ok(());
        }

        let mut driver = connect(&cli).await?;
        let result = build(&mut driver, &plan, &site, collector.prompter_mut()).await;
        if let Err(e) = driver.close().await {
            debug!("closing session: {e}");
        }
        result
    })
}

async fn build<P: Prompter>(
    driver: &mut ExosDriver,
    plan: &CommandPlan,
    site: &SiteConfig,
    prompter: &mut P,
) -> Result<()> {
    let report = apply_plan(driver, plan).await;
    print_report(&report);
    if report.session_lost {
        return Err(ChannelError::Desynchronized.into());
    }

    if let Some(target) = &site.firmware {
        match check_firmware(driver, prompter, target).await? {
            FirmwareStatus::Current => println!("Firmware {} is current", target.version),
            FirmwareStatus::Upgraded => println!("{}", "Firmware installed, the switch is rebooting".green()),
            FirmwareStatus::Declined => {}
        }
    }
    Ok(())
}

async fn connect(cli: &Cli) -> Result<ExosDriver> {
    let host = cli.host.clone().ok_or_else(|| ConfigError::Validation {
        field: "host".into(),
        reason: "--host is required unless --dry-run is given".into(),
    })?;

    let mut builder = DriverBuilder::new(host)
        .port(cli.port)
        .username(&cli.username)
        .timeout(Duration::from_secs(cli.timeout))
        .host_key_verification(cli.host_key);

    builder = match &cli.key {
        Some(path) => builder.private_key(
            path,
            cli.key_passphrase.clone().map(SecretString::from),
        ),
        None => {
            let password = match &cli.password {
                Some(password) => password.clone(),
                None => rpassword::prompt_password(format!("Password for {}: ", cli.username))?,
            };
            builder.password(SecretString::from(password))
        }
    };

    let mut driver = builder.build()?;
    driver.open().await?;
    Ok(driver)
}

/// Run `enable stacking` on the switch, which reboots it.
async fn enable_stacking(cli: &Cli) -> Result<()> {
    let mut driver = connect(cli).await?;
    match driver.execute(&Command::new("enable stacking")).await {
        Ok(_) | Err(Error::Channel(
            ChannelError::Closed | ChannelError::PatternTimeout(_) | ChannelError::Desynchronized,
        )) => {}
        Err(e) => return Err(e),
    }
    if let Err(e) = driver.close().await {
        debug!("closing session: {e}");
    }
    println!("Stacking enabled. Run this tool again once the stack is back up.");
    Ok(())
}

fn print_report(report: &ApplyReport) {
    if report.is_clean() {
        println!("\n{}", "Configuration built".green().bold());
        return;
    }

    warn!("{} commands failed", report.failed());
    println!("\n{}", "The following commands failed:".red().bold());
    for (command, reason) in report.failures() {
        println!("  {} {}", command.red(), reason.dimmed());
    }
    if report.session_lost {
        println!("{}", "The session was lost; later commands and save were not sent.".red());
    }
    println!(
        "\n{} applied, {} skipped, {} failed",
        report.applied(),
        report.skipped(),
        report.failed().red()
    );
}
